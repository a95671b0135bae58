use dynproxy::{
    Any, Arguments, ConversionError, DataType, Dispatch, DispatchError, DispatcherEntry, Dynamic,
    Handle, ObjectRef, ProxyError, ProxyFactory, ProxyInterface,
};

#[derive(Any)]
#[proxy(name = "Vec2")]
struct Point {
    x: i32,
    y: i32,
}

#[dynproxy::interface(namespace = "geometry")]
pub trait IShape {
    fn area(&self) -> i32;
}

#[dynproxy::interface(name = "ICanvas")]
pub trait Canvas: IShape + Send {
    #[proxy(name = "DrawAt")]
    fn draw_at(&mut self, x: i32, y: i32);
    fn origin(&self) -> Handle<Point>;
    fn label(&self, text: String) -> String;
}

#[derive(Default)]
struct Scene {
    calls: Vec<(String, Arguments)>,
}

impl Dispatch for Scene {
    fn invoke(&mut self, method: &str, args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
        self.calls.push((method.to_string(), args.clone()));
        match method {
            "area" => Ok(Some(Dynamic::Int32(12))),
            "DrawAt" => Ok(None),
            "origin" => Ok(Some(Dynamic::Object(ObjectRef::new(Point { x: 1, y: 2 })))),
            "label" => match args.into_vec().pop() {
                Some(Dynamic::String(text)) => Ok(Some(Dynamic::String(text.to_uppercase()))),
                _ => Err(DispatchError::Failed("label expects a string".into())),
            },
            other => Err(DispatchError::UnknownMethod(other.to_string())),
        }
    }
}

#[dynproxy::interface]
pub trait INamed {
    fn nickname(&self) -> Option<String>;
    fn title(&self) -> String;
    fn rename(&mut self, nickname: Option<String>);
}

#[derive(Default)]
struct Directory {
    nickname: Option<String>,
}

impl Dispatch for Directory {
    fn invoke(&mut self, method: &str, args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
        match method {
            "nickname" | "title" => Ok(self.nickname.clone().map(Dynamic::String)),
            "rename" => {
                self.nickname = match args.into_vec().pop() {
                    Some(Dynamic::String(name)) => Some(name),
                    _ => None,
                };
                Ok(None)
            }
            other => Err(DispatchError::UnknownMethod(other.to_string())),
        }
    }
}

fn setup() -> (ProxyFactory, dynproxy::TypeHash) {
    let factory = ProxyFactory::new();
    let base = factory
        .register_dispatcher(DispatcherEntry::new("Scene").with_default_constructor(Scene::default))
        .unwrap();
    (factory, base)
}

#[test]
fn test_derive_any_uses_declared_name() {
    assert_eq!(Point::type_name(), "Vec2");
    assert_eq!(Point::type_hash(), dynproxy::TypeHash::from_name("Vec2"));
    assert!(Point::data_type().is_reference());
    assert_eq!(<Handle<Point> as Any>::type_hash(), Point::type_hash());
}

#[test]
fn test_interface_entry_from_trait() {
    let shape = IShapeProxy::interface_entry();
    assert_eq!(shape.name, "IShape");
    assert_eq!(shape.namespace.as_deref(), Some("geometry"));
    assert_eq!(shape.methods.len(), 1);
    assert!(shape.base_interfaces.is_empty());

    let canvas = CanvasProxy::interface_entry();
    assert_eq!(canvas.name, "ICanvas");
    assert_eq!(canvas.namespace, None);
    assert_eq!(canvas.base_interfaces, [IShapeProxy::type_hash()]);

    let names: Vec<&str> = canvas.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["DrawAt", "origin", "label"]);
    assert!(canvas.methods[0].is_void());
    assert_eq!(canvas.methods[1].return_type, Point::data_type());
}

#[test]
fn test_typed_proxy_forwards_calls() {
    let (factory, base) = setup();
    let mut canvas: CanvasProxy = factory.create(base, vec![]).unwrap();

    canvas.draw_at(3, 4).unwrap();
    assert_eq!(canvas.label("hello".to_string()).unwrap(), "HELLO");

    let origin = canvas.origin().unwrap();
    assert_eq!((origin.x, origin.y), (1, 2));

    let scene = canvas.object().dispatcher::<Scene>().unwrap();
    assert_eq!(
        scene.calls[0],
        (
            "DrawAt".to_string(),
            Arguments::Packed(vec![Dynamic::Int32(3), Dynamic::Int32(4)])
        )
    );
    assert!(scene.calls[2].1.is_no_args());
}

#[test]
fn test_create_registers_base_interfaces() {
    let (factory, base) = setup();
    let canvas: CanvasProxy = factory.create(base, vec![]).unwrap();

    assert!(factory.kinds().contains(IShapeProxy::type_hash()));
    assert!(factory.kinds().contains(CanvasProxy::type_hash()));
    assert_eq!(canvas.object().proxy_type().name(), "Scene$ICanvasProxy");
}

#[test]
fn test_cast_to_base_interface() {
    let (factory, base) = setup();
    let canvas: CanvasProxy = factory.create(base, vec![]).unwrap();

    let mut shape: IShapeProxy = canvas.cast().unwrap();
    assert_eq!(shape.area().unwrap(), 12);

    // Still the same object
    let scene = shape.object().dispatcher::<Scene>().unwrap();
    assert_eq!(scene.calls.len(), 1);
}

#[test]
fn test_cast_to_unimplemented_interface_fails() {
    let (factory, base) = setup();
    let shape: IShapeProxy = factory.create(base, vec![]).unwrap();

    match shape.cast::<CanvasProxy>() {
        Err(err) => assert!(err.is_invalid_argument()),
        Ok(_) => panic!("IShape proxy must not cast to ICanvas"),
    }
}

#[test]
fn test_create_type_for_typed_interface() {
    let (factory, base) = setup();

    let canvas_type = factory.create_type_for::<CanvasProxy>(base).unwrap();
    assert!(canvas_type.implements(CanvasProxy::type_hash()));
    assert!(canvas_type.implements(IShapeProxy::type_hash()));

    let again = factory.create_type_for::<CanvasProxy>(base).unwrap();
    assert!(std::sync::Arc::ptr_eq(&canvas_type, &again));
    assert_eq!(factory.synthesis_count(), 1);
}

#[test]
fn test_optional_strings_carry_null() {
    let factory = ProxyFactory::new();
    let base = factory
        .register_dispatcher(DispatcherEntry::new("Directory").with_default_constructor(Directory::default))
        .unwrap();
    let mut named: INamedProxy = factory.create(base, vec![]).unwrap();

    assert_eq!(INamedProxy::interface_entry().methods[0].return_type, DataType::string());
    assert_eq!(named.nickname().unwrap(), None);

    named.rename(Some("Ada".to_string())).unwrap();
    assert_eq!(named.nickname().unwrap().as_deref(), Some("Ada"));
    assert_eq!(named.title().unwrap(), "Ada");

    named.rename(None).unwrap();
    let directory = named.object().dispatcher::<Directory>().unwrap();
    assert_eq!(directory.nickname, None);
    assert_eq!(named.nickname().unwrap(), None);
}

#[test]
fn test_null_for_plain_string_is_a_conversion_error() {
    let factory = ProxyFactory::new();
    let base = factory
        .register_dispatcher(DispatcherEntry::new("Directory").with_default_constructor(Directory::default))
        .unwrap();
    let mut named: INamedProxy = factory.create(base, vec![]).unwrap();

    // The untyped call sees a null reference
    assert_eq!(named.object_mut().call("title", vec![]).unwrap(), Some(Dynamic::Null));

    match named.title() {
        Err(ProxyError::Conversion(err)) => {
            assert_eq!(err, ConversionError::NullReference { expected: "string".into() });
        }
        other => panic!("expected a null reference error, got {other:?}"),
    }
}
