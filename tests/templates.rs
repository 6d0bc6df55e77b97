//! Template hierarchy: function identity, instance/prototype templates, and
//! inherit linkage.

use hostfn::{Context, Error, FunctionTemplate, Isolate, Value};

fn noop_template(isolate: &Isolate) -> FunctionTemplate {
    FunctionTemplate::new_simple(isolate, |_| None)
}

#[test]
fn one_function_per_template_and_context() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let template = noop_template(&isolate);

    let first = template.get_function(&context).unwrap();
    let second = template.get_function(&context).unwrap();
    assert!(first.same_value(&second));
}

#[test]
fn distinct_contexts_get_distinct_functions() {
    let isolate = Isolate::new();
    let first_context = Context::new(&isolate);
    let second_context = Context::new(&isolate);
    let template = noop_template(&isolate);

    let first = template.get_function(&first_context).unwrap();
    let second = template.get_function(&second_context).unwrap();
    assert!(!first.same_value(&second));
}

#[test]
fn distinct_templates_get_distinct_functions() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);

    let first = noop_template(&isolate).get_function(&context).unwrap();
    let second = noop_template(&isolate).get_function(&context).unwrap();
    assert!(!first.same_value(&second));
}

#[test]
fn instance_template_is_cached_across_accesses() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let template = noop_template(&isolate);

    // Properties set through separate accessor calls land on one template.
    template.instance_template().set("name", "widget");
    template.instance_template().set("size", 3);

    let function = template.get_function(&context).unwrap();
    let instance = function.new_instance(&[]).unwrap();
    assert_eq!(instance.get("name").as_string().as_deref(), Some("widget"));
    assert_eq!(instance.get("size").as_number(), Some(3.0));
}

#[test]
fn instance_properties_are_own_copies() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let template = noop_template(&isolate);
    template.instance_template().set("tag", "fresh");

    let function = template.get_function(&context).unwrap();
    let first = function.new_instance(&[]).unwrap();
    let second = function.new_instance(&[]).unwrap();

    assert!(!first.same_value(&second));
    assert_eq!(first.get("tag").as_string().as_deref(), Some("fresh"));
    assert_eq!(second.get("tag").as_string().as_deref(), Some("fresh"));
}

#[test]
fn prototype_members_are_shared_across_instances() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let class = noop_template(&isolate);
    let method = FunctionTemplate::new_simple(&isolate, |info| Some(info.context().string("hi")));
    class.prototype_template().set("greet", &method);

    let function = class.get_function(&context).unwrap();
    let first = function.new_instance(&[]).unwrap();
    let second = function.new_instance(&[]).unwrap();

    // Both instances see the same function through the shared prototype.
    assert!(first.get("greet").same_value(&second.get("greet")));
    assert!(!first.has("missing"));
}

#[test]
fn template_property_shapes_materialize() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let template = noop_template(&isolate);
    let instance_template = template.instance_template();
    instance_template.set("flag", true);
    instance_template.set("ratio", 0.5);
    instance_template.set("label", String::from("named"));
    instance_template.set("nothing", ());
    instance_template.set("empty", hostfn::TemplateProperty::Null);

    let function = template.get_function(&context).unwrap();
    let instance = function.new_instance(&[]).unwrap();
    assert_eq!(instance.get("flag").as_boolean(), Some(true));
    assert_eq!(instance.get("ratio").as_number(), Some(0.5));
    assert_eq!(instance.get("label").as_string().as_deref(), Some("named"));
    assert!(instance.get("nothing").is_undefined());
    assert!(instance.get("empty").is_null());
}

#[test]
fn inherited_prototype_members_are_visible_on_derived_instances() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);

    let base = noop_template(&isolate);
    let speak = FunctionTemplate::new_simple(&isolate, |info| Some(info.context().string("base")));
    base.prototype_template().set("speak", &speak);

    let derived = noop_template(&isolate);
    derived.inherit(&base);
    derived.prototype_template().set("extra", 1);

    let function = derived.get_function(&context).unwrap();
    let instance = function.new_instance(&[]).unwrap();

    assert!(instance.has("extra"));
    let inherited = instance.get("speak");
    assert!(inherited.is_function());

    // The inherited member is the very function base's prototype exposes.
    let base_instance = base
        .get_function(&context)
        .unwrap()
        .new_instance(&[])
        .unwrap();
    assert!(inherited.same_value(&base_instance.get("speak")));
}

#[test]
fn derived_own_members_shadow_inherited_ones() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);

    let base = noop_template(&isolate);
    base.prototype_template().set("kind", "base");
    let derived = noop_template(&isolate);
    derived.inherit(&base);
    derived.prototype_template().set("kind", "derived");

    let instance = derived
        .get_function(&context)
        .unwrap()
        .new_instance(&[])
        .unwrap();
    assert_eq!(instance.get("kind").as_string().as_deref(), Some("derived"));
}

#[test]
fn inherit_same_base_twice_is_a_noop() {
    let isolate = Isolate::new();
    let base = noop_template(&isolate);
    let derived = noop_template(&isolate);
    derived.inherit(&base);
    derived.inherit(&base);
}

#[test]
#[should_panic(expected = "only be set once")]
fn inherit_retargeting_panics() {
    let isolate = Isolate::new();
    let derived = noop_template(&isolate);
    derived.inherit(&noop_template(&isolate));
    derived.inherit(&noop_template(&isolate));
}

#[test]
#[should_panic(expected = "inherit from itself")]
fn self_inheritance_panics() {
    let isolate = Isolate::new();
    let template = noop_template(&isolate);
    template.inherit(&template.clone());
}

#[test]
#[should_panic(expected = "different isolate")]
fn cross_isolate_inherit_panics() {
    let isolate = Isolate::new();
    let other = Isolate::new();
    noop_template(&isolate).inherit(&noop_template(&other));
}

#[test]
#[should_panic(expected = "different isolate")]
fn cross_isolate_context_panics() {
    let isolate = Isolate::new();
    let other = Isolate::new();
    let context = Context::new(&other);
    let _ = noop_template(&isolate).get_function(&context);
}

#[test]
fn inherit_cycles_surface_as_materialization_errors() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let first = noop_template(&isolate);
    let second = noop_template(&isolate);
    first.inherit(&second);
    second.inherit(&first);

    match first.get_function(&context) {
        Err(Error::Materialization(reason)) => assert!(reason.contains("cycle")),
        other => panic!("expected a materialization error, got {other:?}"),
    }
}

#[test]
fn functions_expose_their_prototype_object() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let template = noop_template(&isolate);
    template.prototype_template().set("shared", 7);

    let function = template.get_function(&context).unwrap();
    let prototype = function.get("prototype");
    assert!(prototype.is_object());
    assert!(!prototype.is_function());

    let instance = function.new_instance(&[]).unwrap();
    assert_eq!(instance.get("shared").as_number(), Some(7.0));
}

#[test]
fn values_survive_their_context_being_dropped_while_retained() {
    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let template = FunctionTemplate::new_simple(&isolate, |info| {
        Some(info.context().string("kept"))
    });
    let function = template.get_function(&context).unwrap();
    let kept: Value = function.call(&context.undefined(), &[]).unwrap();
    drop(context);

    // The wrapper's clone of the context keeps the engine context alive.
    assert_eq!(kept.as_string().as_deref(), Some("kept"));
}
