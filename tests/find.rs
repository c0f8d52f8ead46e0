use std::ops::ControlFlow;

use yang_schema::context::{Context, ContextFlags};
use yang_schema::find::{FindOptions, MatchMode};
use yang_schema::object::ObjectKind;
use yang_schema::object_id::{IdStyle, ObjectIdOptions, Qualify};
use yang_schema::types::{AppInfo, BaseType, ModuleId, NodeId, TypeDef};
use yang_schema::ErrorCode;

// module m {
//   container top {
//     leaf abcX; leaf abcY;
//     choice ch {
//       case one { leaf in-one; }
//       case two { container deep { leaf z; } }
//     }
//     list items { key name; leaf name; leaf-list tags; }
//     leaf renamed { ncx:alt-name short; }
//   }
//   rpc reset { input { leaf delay; } }
// }
fn create_context() -> (Context, ModuleId) {
    let mut ctx = Context::new(ContextFlags::empty());
    let module = ctx
        .add_module("m", Some("2020-01-01"))
        .expect("Failed to add module");
    let mdata = ctx.module_mut(module).expect("Failed to get module");
    mdata.namespace = Some("urn:m".to_owned());
    mdata.prefix = Some("m".to_owned());
    mdata.xmlprefix = Some("mx".to_owned());

    let top = add(&mut ctx, module, None, ObjectKind::Container, "top");
    add(&mut ctx, module, Some(top), ObjectKind::Leaf, "abcX");
    add(&mut ctx, module, Some(top), ObjectKind::Leaf, "abcY");
    let choice = add(&mut ctx, module, Some(top), ObjectKind::Choice, "ch");
    let one = add(&mut ctx, module, Some(choice), ObjectKind::Case, "one");
    add(&mut ctx, module, Some(one), ObjectKind::Leaf, "in-one");
    let two = add(&mut ctx, module, Some(choice), ObjectKind::Case, "two");
    let deep = add(&mut ctx, module, Some(two), ObjectKind::Container, "deep");
    add(&mut ctx, module, Some(deep), ObjectKind::Leaf, "z");
    let items = add(&mut ctx, module, Some(top), ObjectKind::List, "items");
    add(&mut ctx, module, Some(items), ObjectKind::Leaf, "name");
    add(&mut ctx, module, Some(items), ObjectKind::LeafList, "tags");
    ctx.node_mut(items).unwrap().set_keystr("name").unwrap();
    ctx.resolve_list(items).unwrap();
    let renamed = add(&mut ctx, module, Some(top), ObjectKind::Leaf, "renamed");
    ctx.node_mut(renamed)
        .unwrap()
        .add_appinfo(AppInfo::new(Some("ncx"), "alt-name", Some("short")));

    let rpc = add(&mut ctx, module, None, ObjectKind::Rpc, "reset");
    let input = add(&mut ctx, module, Some(rpc), ObjectKind::RpcIo, "input");
    add(&mut ctx, module, Some(input), ObjectKind::Leaf, "delay");

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
fn find_choice_transparency() {
    let (ctx, _) = create_context();
    let top = ctx.find_path("/m:top").unwrap();

    let leaf = top.find_child(None, "in-one").expect("Failed to find leaf");
    assert_eq!(leaf.kind(), ObjectKind::Leaf);
    assert_eq!(leaf.real_parent().map(|snode| snode.id()), Some(top.id()));

    let deep = top
        .find_child_ex(Some("m"), "deep", MatchMode::Exact, false, false)
        .expect("Failed to find container");
    assert_eq!(deep.kind(), ObjectKind::Container);
    assert_eq!(deep.level(), 2);

    // Only the non-deep search matches the choice by its own name.
    assert!(top.find_child(None, "ch").is_none());
    let (choice, _) =
        ctx.find_template(top.datadefs(), None, "ch", FindOptions::exact());
    let choice = ctx.node(choice.unwrap()).unwrap();
    assert_eq!(choice.kind(), ObjectKind::Choice);
    assert!(choice.find_case(None, "two").is_some());
    assert!(choice.find_case(None, "deep").is_none());
}

#[test]
fn find_template_non_deep() {
    let (ctx, _) = create_context();
    let top = ctx.find_path("/m:top").unwrap();

    let (found, count) =
        ctx.find_template(top.datadefs(), None, "abcX", FindOptions::exact());
    assert_eq!(found, Some(top.find_child(None, "abcX").unwrap().id()));
    assert_eq!(count, 1);

    let (found, _) = ctx.find_template(
        top.datadefs(),
        Some("other"),
        "abcX",
        FindOptions::exact(),
    );
    assert_eq!(found, None);
}

#[test]
fn find_ambiguity() {
    let (ctx, _) = create_context();
    let top = ctx.find_path("/m:top").unwrap();

    let error = top
        .find_child_ex(None, "abc", MatchMode::One, false, false)
        .unwrap_err();
    assert_eq!(error.errcode, ErrorCode::MultipleMatches);

    let first = top
        .find_child_ex(None, "abc", MatchMode::First, false, false)
        .expect("Failed to find first match");
    assert_eq!(first.name(), Some("abcX"));

    let error = top
        .find_child_ex(None, "abc", MatchMode::Exact, false, false)
        .unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);

    let (found, count) = top.match_child_str(None, "abc");
    assert_eq!(found.and_then(|snode| snode.name()), Some("abcX"));
    assert_eq!(count, 2);
}

#[test]
fn find_ambiguity_ends_search() {
    let (mut ctx, module) = create_context();
    let top = ctx.find_path("/m:top").unwrap().id();
    let other = add(&mut ctx, module, Some(top), ObjectKind::Leaf, "other");
    ctx.node_mut(other)
        .unwrap()
        .add_appinfo(AppInfo::new(Some("ncx"), "alt-name", Some("abc")));
    let top = ctx.node(top).unwrap();

    // The alt-name pass would match exactly, but the ambiguous partial
    // match of the name pass comes first.
    let error = top
        .find_child_ex(None, "abc", MatchMode::One, true, false)
        .unwrap_err();
    assert_eq!(error.errcode, ErrorCode::MultipleMatches);

    let found = top
        .find_child_ex(None, "abc", MatchMode::Exact, true, false)
        .expect("Failed to find by alt-name");
    assert_eq!(found.id(), other);
}

#[test]
fn find_match_modes() {
    let (ctx, module) = create_context();
    let top = ctx.find_path("/m:top").unwrap();

    assert!(top
        .find_child_ex(None, "ABCX", MatchMode::Exact, false, false)
        .is_err());
    let nocase = top
        .find_child_ex(None, "ABCX", MatchMode::ExactNoCase, false, false)
        .expect("Failed to find case-insensitive match");
    assert_eq!(nocase.name(), Some("abcX"));

    let one = top
        .find_child_ex(None, "ren", MatchMode::One, false, false)
        .expect("Failed to find unique partial match");
    assert_eq!(one.name(), Some("renamed"));

    let first = top
        .find_child_ex(None, "ABC", MatchMode::FirstNoCase, false, false)
        .expect("Failed to find partial case-insensitive match");
    assert_eq!(first.name(), Some("abcX"));

    let smodule = ctx.module(module).unwrap();
    let top2 = smodule
        .find_template_top_ex(None, "to", MatchMode::One, false, false)
        .expect("Failed to find top-level partial match");
    assert_eq!(top2.id(), top.id());
}

#[test]
fn find_alt_names() {
    let (ctx, _) = create_context();
    let top = ctx.find_path("/m:top").unwrap();

    assert!(top
        .find_child_ex(None, "short", MatchMode::Exact, false, false)
        .is_err());
    let renamed = top
        .find_child_ex(None, "short", MatchMode::Exact, true, false)
        .expect("Failed to find by alt-name");
    assert_eq!(renamed.name(), Some("renamed"));
    assert_eq!(renamed.alt_name(), Some("short"));
}

#[test]
fn find_data_only() {
    let (ctx, module) = create_context();
    let smodule = ctx.module(module).unwrap();

    assert!(smodule
        .find_template_top_ex(None, "reset", MatchMode::Exact, false, false)
        .is_ok());
    let error = smodule
        .find_template_top_ex(None, "reset", MatchMode::Exact, false, true)
        .unwrap_err();
    assert_eq!(error.errcode, ErrorCode::DefNotFound);
}

#[test]
fn find_template_all_modules() {
    let (mut ctx, _) = create_context();
    let other = ctx.add_module("other", None).unwrap();
    add(&mut ctx, other, None, ObjectKind::Container, "solo");

    let solo = ctx.find_template_all(None, "solo").expect("Failed to find");
    assert_eq!(solo.module_name(), Some("other"));
    assert!(ctx.find_template_all(Some("m"), "solo").is_none());
    assert!(ctx.find_template_all(Some("m"), "top").is_some());
}

#[test]
fn find_path_errors() {
    let (ctx, _) = create_context();

    assert_eq!(
        ctx.find_path("m:top").unwrap_err().errcode,
        ErrorCode::InvalidValue
    );
    assert_eq!(
        ctx.find_path("/m:top/nothing").unwrap_err().errcode,
        ErrorCode::DefNotFound
    );
    assert_eq!(
        ctx.find_path("/nomod:top").unwrap_err().errcode,
        ErrorCode::DefNotFound
    );
}

#[test]
fn find_walkers() {
    let (ctx, _) = create_context();
    let top = ctx.find_path("/m:top").unwrap();

    let mut names = Vec::new();
    let called = top.find_all_children(None, None, false, |snode| {
        names.push(snode.name().unwrap().to_owned());
        ControlFlow::Continue(())
    });
    assert!(called);
    assert_eq!(
        names,
        vec!["abcX", "abcY", "in-one", "deep", "items", "renamed"]
    );

    let mut names = Vec::new();
    top.find_all_descendants(None, None, false, |snode| {
        names.push(snode.name().unwrap().to_owned());
        if snode.name() == Some("deep") {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    assert_eq!(names, vec!["abcX", "abcY", "in-one", "deep"]);

    let z = ctx.find_path("/m:top/deep/z").unwrap();
    let mut names = Vec::new();
    z.find_all_ancestors(None, None, false, |snode| {
        names.push(snode.name().unwrap().to_owned());
        ControlFlow::Continue(())
    });
    assert_eq!(names, vec!["deep", "top"]);

    assert!(!top.find_all_children(Some("other"), None, false, |_| {
        ControlFlow::Continue(())
    }));
}

#[test]
fn object_id_styles() {
    let (ctx, _) = create_context();
    let z = ctx.find_path("/m:top/deep/z").unwrap();

    assert_eq!(
        z.gen_object_id(&ObjectIdOptions::xpath()),
        "/m:top/ch/two/deep/z"
    );
    assert_eq!(
        z.gen_object_id(&ObjectIdOptions::xpath().qualify(Qualify::Prefix)),
        "/mx:top/mx:deep/mx:z"
    );
    assert_eq!(
        z.gen_object_id(&ObjectIdOptions::xpath().qualify(Qualify::Always)),
        "/m:top/m:ch/m:two/m:deep/m:z"
    );

    let name = ctx.find_path("/m:top/items/name").unwrap();
    let options = ObjectIdOptions {
        style: IdStyle::Code,
        ..Default::default()
    };
    assert_eq!(name.gen_object_id(&options), "m_top.items.name");

    let in_one = ctx.find_path("/m:top/in-one").unwrap();
    assert_eq!(
        in_one.gen_object_id(&ObjectIdOptions::code()),
        "m_top.ch.one.in_one"
    );
}

#[test]
fn object_id_relative() {
    let (ctx, _) = create_context();
    let items = ctx.find_path("/m:top/items").unwrap();
    let name = items.find_child(None, "name").unwrap();

    let options = ObjectIdOptions::xpath().stop(items.id());
    assert_eq!(name.gen_object_id(&options), "name");

    let top = ctx.find_path("/m:top").unwrap();
    let options = ObjectIdOptions::xpath().stop(top.id());
    assert_eq!(name.gen_object_id(&options), "items/name");

    // A stop node off the ancestor chain gives the absolute path.
    let z = ctx.find_path("/m:top/deep/z").unwrap();
    let options = ObjectIdOptions::xpath().stop(z.id());
    assert_eq!(name.gen_object_id(&options), "/m:top/items/name");
    assert_eq!(name.object_id_len(&options), "/m:top/items/name".len());
    let options = ObjectIdOptions::xpath().stop(name.id());
    assert_eq!(name.gen_object_id(&options), "/m:top/items/name");
}

#[test]
fn object_id_buffer() {
    let (ctx, _) = create_context();
    let name = ctx.find_path("/m:top/items/name").unwrap();
    let options = ObjectIdOptions::xpath();

    let len = name.object_id_len(&options);
    assert_eq!(len, "/m:top/items/name".len());

    let mut buf = vec![0u8; len];
    let written = name
        .copy_object_id(&options, &mut buf)
        .expect("Failed to copy object identifier");
    assert_eq!(written, len);
    assert_eq!(&buf[..written], b"/m:top/items/name");

    let mut short = vec![0u8; len - 1];
    let error = name.copy_object_id(&options, &mut short).unwrap_err();
    assert_eq!(error.errcode, ErrorCode::BufferOverflow);
}

#[test]
fn object_id_round_trip() {
    let (ctx, _) = create_context();

    for snode in ctx.traverse() {
        if snode.ancestors().any(|a| a.kind().is_choice_or_case())
            || snode.kind().is_choice_or_case()
        {
            continue;
        }
        let path = snode.gen_object_id(&ObjectIdOptions::xpath());
        let found = ctx
            .find_path(&path)
            .unwrap_or_else(|_| panic!("Failed to resolve {}", path));
        assert_eq!(found.id(), snode.id(), "{}", path);
    }
}
