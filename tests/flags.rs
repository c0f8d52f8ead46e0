use yang_schema::context::{Context, ContextFlags};
use yang_schema::feature::Feature;
use yang_schema::find::MatchMode;
use yang_schema::object::{ObjectFlags, ObjectKind};
use yang_schema::types::{
    Access, AppInfo, BaseType, ModuleId, NodeId, TypeDef, XPathExpr,
};
use yang_schema::ErrorCode;

fn create_context() -> (Context, ModuleId) {
    let mut ctx = Context::new(ContextFlags::empty());
    let module = ctx
        .add_module("m", Some("2020-01-01"))
        .expect("Failed to add module");
    let mdata = ctx.module_mut(module).expect("Failed to get module");
    mdata.namespace = Some("urn:m".to_owned());
    mdata.prefix = Some("m".to_owned());
    (ctx, module)
}

fn add(
    ctx: &mut Context,
    module: ModuleId,
    parent: Option<NodeId>,
    kind: ObjectKind,
    name: &str,
) -> NodeId {
    let id = ctx.new_node(module, kind, name).expect("Failed to create node");
    if matches!(kind, ObjectKind::Leaf | ObjectKind::LeafList) {
        ctx.node_mut(id)
            .unwrap()
            .set_type(TypeDef::builtin(BaseType::String))
            .unwrap();
    }
    match parent {
        Some(parent) => ctx.add_child(parent, id),
        None => ctx.add_top_node(module, id),
    }
    .expect("Failed to link node");
    id
}

#[test]
fn flags_config_inheritance() {
    let (mut ctx, module) = create_context();
    let state = add(&mut ctx, module, None, ObjectKind::Container, "state");
    ctx.node_mut(state).unwrap().set_config(false).unwrap();
    let inner =
        add(&mut ctx, module, Some(state), ObjectKind::Container, "inner");
    let counter =
        add(&mut ctx, module, Some(inner), ObjectKind::Leaf, "counter");
    let conf = add(&mut ctx, module, None, ObjectKind::Container, "conf");

    let inner = ctx.node(inner).unwrap();
    assert!(!inner.is_config());
    assert_eq!(inner.config_flag(), Some(false));
    assert_eq!(inner.config_flag_check(), Some(false));
    assert_eq!(inner.max_access(), Access::ReadOnly);
    assert!(!ctx.node(counter).unwrap().is_config());

    let conf = ctx.node(conf).unwrap();
    assert!(conf.is_config());
    assert_eq!(conf.config_flag_check(), Some(true));
    assert_eq!(conf.max_access(), Access::ReadCreate);

    assert!(!conf.has_ro_children());
    let state = ctx.node(state).unwrap();
    assert!(state.has_ro_children());
}

#[test]
fn flags_rpc_and_notification() {
    let (mut ctx, module) = create_context();
    let rpc = add(&mut ctx, module, None, ObjectKind::Rpc, "reset");
    let input = add(&mut ctx, module, Some(rpc), ObjectKind::RpcIo, "input");
    let delay = add(&mut ctx, module, Some(input), ObjectKind::Leaf, "delay");
    let output = add(&mut ctx, module, Some(rpc), ObjectKind::RpcIo, "output");
    let result =
        add(&mut ctx, module, Some(output), ObjectKind::Leaf, "result");
    let notif = add(&mut ctx, module, None, ObjectKind::Notification, "event");
    let reason = add(&mut ctx, module, Some(notif), ObjectKind::Leaf, "reason");

    let delay = ctx.node(delay).unwrap();
    assert!(delay.is_config());
    assert!(delay.in_rpc());
    assert!(!delay.is_data());

    let result = ctx.node(result).unwrap();
    assert!(!result.is_config());
    assert!(result.in_rpc_reply());

    let reason = ctx.node(reason).unwrap();
    assert!(!reason.is_config());
    assert!(reason.in_notif());
    assert!(!ctx.node(notif).unwrap().is_data_db());

    let uses = ctx.new_node(module, ObjectKind::Uses, "g").unwrap();
    assert_eq!(ctx.node(uses).unwrap().config_flag(), None);
}

#[test]
fn flags_config_check_in_grouping_and_root() {
    use yang_schema::object::{Grouping, GroupingOwner};

    let (mut ctx, module) = create_context();
    let grouping = ctx
        .add_grouping(
            GroupingOwner::Module(module),
            Grouping {
                name: "g".to_owned(),
                ..Default::default()
            },
        )
        .unwrap();
    let member = ctx.new_node(module, ObjectKind::Container, "member").unwrap();
    ctx.add_grouping_node(grouping, member).unwrap();
    assert_eq!(ctx.node(member).unwrap().config_flag_check(), None);

    let root = add(&mut ctx, module, None, ObjectKind::Container, "config");
    let robj = ctx.node_mut(root).unwrap();
    robj.add_appinfo(AppInfo::new(Some("ncx"), "root", None));
    ctx.set_ncx_flags(root).unwrap();
    let root = ctx.node(root).unwrap();
    assert!(root.flags().contains(ObjectFlags::ROOT));
    assert_eq!(root.config_flag_check(), Some(false));
}

#[test]
fn flags_presence_exemption() {
    let (mut ctx, module) = create_context();
    let np = add(&mut ctx, module, None, ObjectKind::Container, "np");
    let leaf = add(&mut ctx, module, Some(np), ObjectKind::Leaf, "required");
    ctx.node_mut(leaf).unwrap().set_mandatory(true).unwrap();
    let p = add(&mut ctx, module, None, ObjectKind::Container, "p");
    ctx.node_mut(p).unwrap().set_presence("enables p").unwrap();
    let leaf = add(&mut ctx, module, Some(p), ObjectKind::Leaf, "required");
    ctx.node_mut(leaf).unwrap().set_mandatory(true).unwrap();

    let np = ctx.node(np).unwrap();
    assert!(np.is_np_container());
    assert!(np.is_mandatory());
    let p = ctx.node(p).unwrap();
    assert!(!p.is_np_container());
    assert!(!p.is_mandatory());
    assert!(p.find_child(None, "required").unwrap().is_mandatory());
}

#[test]
fn flags_list_mandatory() {
    let (mut ctx, module) = create_context();
    let list = add(&mut ctx, module, None, ObjectKind::List, "l");
    let key = add(&mut ctx, module, Some(list), ObjectKind::Leaf, "k");
    let values = add(&mut ctx, module, Some(list), ObjectKind::LeafList, "v");
    ctx.node_mut(values).unwrap().set_min_elements(2).unwrap();
    ctx.node_mut(list).unwrap().set_keystr("k").unwrap();
    ctx.resolve_list(list).unwrap();

    assert!(!ctx.node(list).unwrap().is_mandatory());
    assert!(ctx.node(values).unwrap().is_mandatory());
    let key = ctx.node(key).unwrap();
    assert!(key.is_mandatory());
    assert!(!key.flags().contains(ObjectFlags::MANDSET));
    assert!(key.is_leafy());
    assert!(ctx.node(list).unwrap().is_system_ordered());
}

#[test]
fn flags_mandatory_when() {
    let (mut ctx, module) = create_context();
    let top = add(&mut ctx, module, None, ObjectKind::Container, "top");
    let cond = add(&mut ctx, module, Some(top), ObjectKind::Leaf, "cond");
    let cobj = ctx.node_mut(cond).unwrap();
    cobj.set_mandatory(true).unwrap();
    cobj.set_when(XPathExpr::new("../mode = 'x'"));
    let state = add(&mut ctx, module, Some(top), ObjectKind::Leaf, "state");
    let sobj = ctx.node_mut(state).unwrap();
    sobj.set_mandatory(true).unwrap();
    sobj.set_config(false).unwrap();

    let cond = ctx.node(cond).unwrap();
    assert!(cond.is_mandatory());
    assert!(!cond.is_mandatory_when(false));
    assert!(cond.has_when_stmts());

    let state = ctx.node(state).unwrap();
    assert!(state.is_mandatory_when(false));
    assert!(!state.is_mandatory_when(true));

    let top = ctx.node(top).unwrap();
    assert!(top.is_mandatory_when(false));
    assert!(!top.is_mandatory_when(true));
}

#[test]
fn flags_disabled_feature_on_case() {
    let (mut ctx, module) = create_context();
    ctx.feature_config_mut()
        .set_enable_entry("m:f", false)
        .unwrap();
    ctx.add_feature(module, Feature::new("f")).unwrap();

    let top = add(&mut ctx, module, None, ObjectKind::Container, "top");
    let choice = add(&mut ctx, module, Some(top), ObjectKind::Choice, "ch");
    let case = add(&mut ctx, module, Some(choice), ObjectKind::Case, "a");
    ctx.add_iffeature(case, "f").unwrap();
    let leaf = add(&mut ctx, module, Some(case), ObjectKind::Leaf, "x");
    let inner =
        add(&mut ctx, module, Some(case), ObjectKind::Container, "inner");
    let nested = add(&mut ctx, module, Some(inner), ObjectKind::Leaf, "y");
    let other = add(&mut ctx, module, Some(choice), ObjectKind::Case, "b");
    let visible = add(&mut ctx, module, Some(other), ObjectKind::Leaf, "z");

    assert!(!ctx.node(leaf).unwrap().is_enabled());
    assert!(!ctx.node(nested).unwrap().is_enabled());
    assert!(ctx.node(visible).unwrap().is_enabled());

    let top = ctx.node(top).unwrap();
    assert!(top.find_child(None, "x").is_none());
    assert!(top.find_child(None, "z").is_some());
}

#[test]
fn flags_feature_dependencies() {
    let (mut ctx, module) = create_context();
    ctx.feature_config_mut()
        .set_enable_entry("base", false)
        .unwrap();
    let base = ctx.add_feature(module, Feature::new("base")).unwrap();
    let derived = ctx.add_feature(module, Feature::new("derived")).unwrap();
    ctx.add_feature_iffeature(derived, "base").unwrap();

    assert!(!ctx.feature_enabled(base));
    assert!(ctx.feature(derived).unwrap().enabled);
    assert!(!ctx.feature_enabled(derived));

    let smodule = ctx.module(module).unwrap();
    assert_eq!(smodule.feature_value("base"), Some(false));
    assert_eq!(smodule.feature_value("nothing"), None);
}

#[test]
fn flags_feature_enable_conflicts() {
    let mut ctx = Context::new(ContextFlags::DISABLE_FEATURES);
    let config = ctx.feature_config_mut();
    assert!(!config.enable_default());

    config.set_enable_entry("m:f", true).unwrap();
    config.set_enable_entry("m:f", true).unwrap();
    let error = config.set_enable_entry("m:f", false).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::InvalidValue);
    assert!(config.enabled_for("m", "f"));

    let error = config.set_enable_entry("a:b:c", true).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::InvalidValue);

    // A disable overrides an enable, never the reverse.
    config.set_enable("m", "g", true);
    config.set_enable("m", "g", false);
    assert!(!config.enabled_for("m", "g"));
    config.set_enable("m", "g", true);
    assert!(!config.enabled_for("m", "g"));

    assert!(!config.enabled_for("m", "unset"));
}

#[test]
fn flags_submodule_features() {
    let (mut ctx, module) = create_context();
    ctx.add_feature(module, Feature::new("main-f")).unwrap();
    let sub = ctx.add_submodule("m-sub", None, module).unwrap();
    ctx.add_feature(sub, Feature::new("sub-f")).unwrap();
    ctx.module_mut(module).unwrap().add_include("m-sub", None);

    let smodule = ctx.module(module).unwrap();
    assert_eq!(
        smodule
            .enabled_features()
            .map(|feature| feature.name.as_str())
            .collect::<Vec<_>>(),
        vec!["main-f", "sub-f"]
    );
    assert_eq!(
        smodule.capability_uri(),
        "urn:m?module=m&revision=2020-01-01&features=main-f,sub-f"
    );
}

#[test]
fn flags_disabled_feature_on_container() {
    let (mut ctx, module) = create_context();
    ctx.feature_config_mut()
        .set_enable_entry("m:f", false)
        .unwrap();
    ctx.add_feature(module, Feature::new("f")).unwrap();

    let top = add(&mut ctx, module, None, ObjectKind::Container, "top");
    let gated =
        add(&mut ctx, module, Some(top), ObjectKind::Container, "gated");
    ctx.add_iffeature(gated, "f").unwrap();
    let leaf = add(&mut ctx, module, Some(gated), ObjectKind::Leaf, "x");

    assert!(ctx.node(top).unwrap().is_enabled());
    assert!(!ctx.node(gated).unwrap().is_enabled());
    assert!(!ctx.node(leaf).unwrap().is_enabled());

    let error = ctx
        .node(gated)
        .unwrap()
        .find_child_ex(None, "x", MatchMode::Exact, false, false)
        .unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);
}
