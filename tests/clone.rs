use std::sync::Arc;

use yang_schema::context::{Context, ContextFlags};
use yang_schema::feature::Feature;
use yang_schema::find::MatchMode;
use yang_schema::object::{
    Grouping, GroupingOwner, GroupingRef, ObjectDef, ObjectFlags, ObjectKind,
};
use yang_schema::object_id::ObjectIdOptions;
use yang_schema::types::{
    BaseType, ModuleId, NodeId, TypeDef, Typedef, XPathExpr,
};
use yang_schema::ErrorCode;

struct Fixture {
    ctx: Context,
    module: ModuleId,
    grouping: GroupingRef,
    top: NodeId,
}

// grouping g {
//   leaf x { description "orig"; reference "ref-x"; }
//   container c { typedef t; leaf y; }
//   list gl { key k; leaf k; }
// }
// container top;
fn create_context() -> Fixture {
    let mut ctx = Context::new(ContextFlags::QUIET_DUPLICATES);
    let module = ctx
        .add_module("m", Some("2020-01-01"))
        .expect("Failed to add module");
    let mdata = ctx.module_mut(module).expect("Failed to get module");
    mdata.namespace = Some("urn:m".to_owned());
    mdata.prefix = Some("m".to_owned());

    let grouping = ctx
        .add_grouping(
            GroupingOwner::Module(module),
            Grouping {
                name: "g".to_owned(),
                ..Default::default()
            },
        )
        .expect("Failed to add grouping");

    let x = new_leaf(&mut ctx, module, "x");
    let xobj = ctx.node_mut(x).unwrap();
    xobj.set_description("orig").unwrap();
    xobj.set_reference("ref-x").unwrap();
    ctx.add_grouping_node(grouping, x).unwrap();

    let c = ctx.new_node(module, ObjectKind::Container, "c").unwrap();
    ctx.add_grouping_node(grouping, c).unwrap();
    ctx.add_typedef(c, Typedef::new("t", TypeDef::builtin(BaseType::Uint8)))
        .unwrap();
    let y = new_leaf(&mut ctx, module, "y");
    ctx.add_child(c, y).unwrap();

    let gl = ctx.new_node(module, ObjectKind::List, "gl").unwrap();
    ctx.add_grouping_node(grouping, gl).unwrap();
    let k = new_leaf(&mut ctx, module, "k");
    ctx.add_child(gl, k).unwrap();
    ctx.node_mut(gl).unwrap().set_keystr("k").unwrap();
    ctx.resolve_list(gl).unwrap();

    let top = ctx.new_node(module, ObjectKind::Container, "top").unwrap();
    ctx.add_top_node(module, top).unwrap();

    Fixture {
        ctx,
        module,
        grouping,
        top,
    }
}

fn new_leaf(ctx: &mut Context, module: ModuleId, name: &str) -> NodeId {
    let id = ctx.new_node(module, ObjectKind::Leaf, name).unwrap();
    ctx.node_mut(id)
        .unwrap()
        .set_type(TypeDef::builtin(BaseType::String))
        .unwrap();
    id
}

fn grouping_member(fx: &Fixture, name: &str) -> NodeId {
    let grouping = fx.ctx.grouping(fx.grouping).unwrap();
    grouping
        .datadefs
        .iter()
        .copied()
        .find(|id| fx.ctx.node(*id).unwrap().name() == Some(name))
        .unwrap()
}

fn add_uses(fx: &mut Fixture, parent: NodeId) -> NodeId {
    let uses = fx.ctx.new_node(fx.module, ObjectKind::Uses, "g").unwrap();
    fx.ctx.add_child(parent, uses).unwrap();
    uses
}

fn child_names(ctx: &Context, id: NodeId) -> Vec<String> {
    ctx.node(id)
        .unwrap()
        .children()
        .map(|snode| snode.name().unwrap().to_owned())
        .collect()
}

#[test]
fn clone_independence() {
    let mut fx = create_context();
    let x = grouping_member(&fx, "x");

    let clone = fx
        .ctx
        .clone_template(fx.module, x, &[])
        .expect("Failed to clone node");
    fx.ctx
        .node_mut(clone)
        .unwrap()
        .set_description("changed")
        .unwrap();

    let source = fx.ctx.node(x).unwrap();
    let cloned = fx.ctx.node(clone).unwrap();
    assert_eq!(source.description(), Some("orig"));
    assert_eq!(cloned.description(), Some("changed"));
    assert_eq!(cloned.reference(), Some("ref-x"));
    assert!(Arc::ptr_eq(source.typdef().unwrap(), cloned.typdef().unwrap()));
    assert!(cloned.flags().contains(ObjectFlags::CLONE));
    assert!(!source.flags().contains(ObjectFlags::CLONE));
}

#[test]
fn clone_shares_typedefs() {
    let mut fx = create_context();
    let c = grouping_member(&fx, "c");

    let clone = fx.ctx.clone_template(fx.module, c, &[]).unwrap();

    let source = fx.ctx.node(c).unwrap();
    let cloned = fx.ctx.node(clone).unwrap();
    let src_typedefs = source.template().def().typedefs();
    let clone_typedefs = cloned.template().def().typedefs();
    assert_eq!(clone_typedefs.len(), 1);
    assert!(std::ptr::eq(src_typedefs.as_ptr(), clone_typedefs.as_ptr()));
    assert_ne!(source.datadefs(), cloned.datadefs());
    assert_eq!(child_names(&fx.ctx, clone), vec!["y"]);
    assert!(cloned.find_typedef("t").is_some());
}

#[test]
fn clone_list_keys() {
    let mut fx = create_context();
    let gl = grouping_member(&fx, "gl");

    let clone = fx.ctx.clone_template(fx.module, gl, &[]).unwrap();

    let cloned = fx.ctx.node(clone).unwrap();
    let key = cloned.list_keys().next().expect("Cloned list has no key");
    assert_eq!(key.name(), Some("k"));
    assert_eq!(
        key.ancestors().next().map(|snode| snode.id()),
        Some(clone)
    );
    assert!(key.is_list_key());
}

#[test]
fn clone_uses_expansion() {
    let mut fx = create_context();
    let top = fx.top;
    let uses = add_uses(&mut fx, top);

    fx.ctx.expand_uses(uses).expect("Failed to expand uses");

    assert_eq!(child_names(&fx.ctx, top), vec!["x", "c", "gl"]);
    let c = fx.ctx.find_path("/m:top/c").expect("Failed to find clone");
    assert_eq!(c.uses_obj().map(|snode| snode.id()), Some(uses));
    assert_eq!(
        c.gen_object_id(&ObjectIdOptions::xpath()),
        "/m:top/c"
    );
    assert!(c
        .find_child_ex(None, "y", MatchMode::Exact, false, false)
        .is_ok());

    // Expanding twice is a no-op.
    fx.ctx.expand_uses(uses).expect("Failed to expand uses again");
    assert_eq!(child_names(&fx.ctx, top), vec!["x", "c", "gl"]);
}

#[test]
fn clone_refine_precedence() {
    let mut fx = create_context();
    let top = fx.top;
    let uses = add_uses(&mut fx, top);

    let rx = fx.ctx.new_node(fx.module, ObjectKind::Refine, "x").unwrap();
    let robj = fx.ctx.node_mut(rx).unwrap();
    robj.set_description("new").unwrap();
    robj.set_mandatory(true).unwrap();
    fx.ctx.add_child(uses, rx).unwrap();

    let rc = fx.ctx.new_node(fx.module, ObjectKind::Refine, "c").unwrap();
    let robj = fx.ctx.node_mut(rc).unwrap();
    robj.set_presence("enabled").unwrap();
    robj.set_config(false).unwrap();
    fx.ctx.add_child(uses, rc).unwrap();

    fx.ctx.expand_uses(uses).expect("Failed to expand uses");

    let x = fx.ctx.find_path("/m:top/x").unwrap();
    assert_eq!(x.description(), Some("new"));
    assert_eq!(x.reference(), Some("ref-x"));
    assert!(x.is_mandatory());

    let c = fx.ctx.find_path("/m:top/c").unwrap();
    assert_eq!(c.presence(), Some("enabled"));
    assert!(!c.is_config());
    assert!(!c.find_child(None, "y").unwrap().is_config());

    // The grouping itself is untouched.
    let source = fx.ctx.node(grouping_member(&fx, "x")).unwrap();
    assert_eq!(source.description(), Some("orig"));
    assert!(!source.is_mandatory());
    let source = fx.ctx.node(grouping_member(&fx, "c")).unwrap();
    assert_eq!(source.presence(), None);
    assert_eq!(source.config_flag_check(), None);
}

#[test]
fn clone_refine_missing_target() {
    let mut fx = create_context();
    let top = fx.top;
    let uses = add_uses(&mut fx, top);
    let refine = fx
        .ctx
        .new_node(fx.module, ObjectKind::Refine, "c/nothing")
        .unwrap();
    fx.ctx.add_child(uses, refine).unwrap();

    let error = fx.ctx.expand_uses(uses).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);
    assert!(fx.ctx.node(top).unwrap().children().next().is_some());
}

#[test]
fn clone_uses_in_choice() {
    let mut fx = create_context();
    let choice = fx
        .ctx
        .new_node(fx.module, ObjectKind::Choice, "ch")
        .unwrap();
    fx.ctx.add_child(fx.top, choice).unwrap();
    let uses = add_uses(&mut fx, choice);

    fx.ctx.expand_uses(uses).expect("Failed to expand uses");

    let snode = fx.ctx.node(choice).unwrap();
    let case = snode.find_case(None, "x").expect("Missing synthetic case");
    assert!(case.is_short_case());
    assert!(case.flags().contains(ObjectFlags::CLONE));
    let top = fx.ctx.node(fx.top).unwrap();
    assert_eq!(
        top.find_child(None, "y").map(|snode| snode.kind()),
        None
    );
    assert_eq!(
        top.find_child(None, "x").map(|snode| snode.kind()),
        Some(ObjectKind::Leaf)
    );
}

#[test]
fn clone_uses_inherits_when_and_iffeature() {
    let mut fx = create_context();
    fx.ctx
        .feature_config_mut()
        .set_enable_entry("m:f", false)
        .unwrap();
    fx.ctx.add_feature(fx.module, Feature::new("f")).unwrap();
    let top = fx.top;
    let uses = add_uses(&mut fx, top);
    fx.ctx
        .node_mut(uses)
        .unwrap()
        .set_when(XPathExpr::new("../mode = 'on'"));
    fx.ctx.add_iffeature(uses, "f").unwrap();

    fx.ctx.expand_uses(uses).expect("Failed to expand uses");

    let top = fx.ctx.node(top).unwrap();
    let x = top
        .children()
        .find(|snode| snode.name() == Some("x"))
        .unwrap();
    assert_eq!(x.inherited_whens().len(), 1);
    assert!(x.has_when_stmts());
    assert!(x.flags().contains(ObjectFlags::CONDITIONAL));
    assert!(!x.is_enabled());
    assert!(top.find_child(None, "x").is_none());
    assert!(!top.has_children());
}

#[test]
fn clone_uses_missing_grouping() {
    let mut fx = create_context();
    let uses = fx
        .ctx
        .new_node(fx.module, ObjectKind::Uses, "nothing")
        .unwrap();
    fx.ctx.add_child(fx.top, uses).unwrap();

    let error = fx.ctx.expand_uses(uses).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);

    let error = fx.ctx.expand_uses(fx.top).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::InternalValue);
}

#[test]
fn clone_uses_nested_augment() {
    let mut fx = create_context();
    let top = fx.top;
    let uses = add_uses(&mut fx, top);
    let augment = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "c")
        .unwrap();
    fx.ctx.add_child(uses, augment).unwrap();
    let added = new_leaf(&mut fx.ctx, fx.module, "added");
    fx.ctx.add_child(augment, added).unwrap();

    fx.ctx.expand_uses(uses).expect("Failed to expand uses");

    let added = fx.ctx.find_path("/m:top/c/added").unwrap();
    assert!(added.flags().contains(ObjectFlags::AUGCLONE));
    assert_eq!(added.aug_obj().map(|snode| snode.id()), Some(augment));
}

#[test]
fn clone_uses_failed_augment_leaves_tree_unchanged() {
    let mut fx = create_context();
    let top = fx.top;
    let pre = new_leaf(&mut fx.ctx, fx.module, "pre");
    fx.ctx.add_child(top, pre).unwrap();
    let uses = add_uses(&mut fx, top);

    let good = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "c")
        .unwrap();
    fx.ctx.add_child(uses, good).unwrap();
    let added = new_leaf(&mut fx.ctx, fx.module, "added");
    fx.ctx.add_child(good, added).unwrap();
    let bad = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "missing")
        .unwrap();
    fx.ctx.add_child(uses, bad).unwrap();

    let error = fx.ctx.expand_uses(uses).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);

    let children = fx
        .ctx
        .node(top)
        .unwrap()
        .children()
        .map(|snode| snode.id())
        .collect::<Vec<_>>();
    assert_eq!(children, vec![pre, uses]);
    assert!(fx.ctx.find_path("/m:top/c").is_err());
    assert!(matches!(
        fx.ctx.node(uses).unwrap().template().def(),
        ObjectDef::Uses(def) if !def.expand_done
    ));
    assert_eq!(
        fx.ctx.node(good).unwrap().ancestors().next().map(|s| s.id()),
        Some(uses)
    );
}

#[test]
fn clone_augment_other_module() {
    let mut fx = create_context();
    let m2 = fx.ctx.add_module("m2", None).unwrap();
    let mdata = fx.ctx.module_mut(m2).unwrap();
    mdata.prefix = Some("m2".to_owned());
    mdata.add_import("m", "mp", None);

    let augment = fx
        .ctx
        .new_node(m2, ObjectKind::Augment, "/mp:top")
        .unwrap();
    fx.ctx.add_top_node(m2, augment).unwrap();
    let extra = new_leaf(&mut fx.ctx, m2, "extra");
    fx.ctx.add_child(augment, extra).unwrap();

    assert_eq!(fx.ctx.resolve_augment_target(augment).unwrap(), fx.top);
    fx.ctx.expand_augment(augment).expect("Failed to expand augment");

    let extra = fx.ctx.find_path("/m:top/m2:extra").unwrap();
    assert_eq!(extra.module_name(), Some("m2"));
    assert_eq!(
        extra.gen_object_id(&ObjectIdOptions::xpath()),
        "/m:top/m2:extra"
    );
    assert_eq!(fx.ctx.module(m2).unwrap().data().count(), 0);
}

#[test]
fn clone_augment_into_choice() {
    let mut fx = create_context();
    let choice = fx
        .ctx
        .new_node(fx.module, ObjectKind::Choice, "ch")
        .unwrap();
    fx.ctx.add_child(fx.top, choice).unwrap();

    let augment = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "/m:top/ch")
        .unwrap();
    fx.ctx.add_top_node(fx.module, augment).unwrap();
    let extra = new_leaf(&mut fx.ctx, fx.module, "extra");
    fx.ctx.add_child(augment, extra).unwrap();

    fx.ctx.expand_augment(augment).expect("Failed to expand augment");

    let case = fx.ctx.node(choice).unwrap().find_case(None, "extra").unwrap();
    assert!(case.flags().contains(ObjectFlags::AUGCLONE));
    assert!(case.is_short_case());
}

#[test]
fn clone_augment_duplicate_discarded() {
    let mut fx = create_context();
    let x = new_leaf(&mut fx.ctx, fx.module, "x");
    fx.ctx.add_child(fx.top, x).unwrap();

    let augment = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "/m:top")
        .unwrap();
    fx.ctx.add_top_node(fx.module, augment).unwrap();
    let dup = new_leaf(&mut fx.ctx, fx.module, "x");
    fx.ctx.add_child(augment, dup).unwrap();

    fx.ctx.expand_augment(augment).expect("Failed to expand augment");

    assert_eq!(child_names(&fx.ctx, fx.top), vec!["x"]);
    assert_eq!(fx.ctx.find_path("/m:top/x").unwrap().id(), x);
}

#[test]
fn clone_augment_bad_target() {
    let mut fx = create_context();
    let x = new_leaf(&mut fx.ctx, fx.module, "x");
    fx.ctx.add_child(fx.top, x).unwrap();

    let missing = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "/m:nothing")
        .unwrap();
    fx.ctx.add_top_node(fx.module, missing).unwrap();
    let error = fx.ctx.expand_augment(missing).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);

    let leaf = fx
        .ctx
        .new_node(fx.module, ObjectKind::Augment, "/m:top/x")
        .unwrap();
    fx.ctx.add_top_node(fx.module, leaf).unwrap();
    let error = fx.ctx.expand_augment(leaf).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::InternalValue);
}
