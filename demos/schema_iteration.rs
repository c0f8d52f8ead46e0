use log::LevelFilter;
use yang_schema::context::{Context, ContextFlags};
use yang_schema::object::{Grouping, GroupingOwner, ObjectKind};
use yang_schema::object_id::ObjectIdOptions;
use yang_schema::types::{BaseType, ModuleId, NodeId, TypeDef};

static MODULE_NAME: &str = "example-interfaces";

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
            .expect("Failed to get node")
            .set_type(TypeDef::builtin(BaseType::String))
            .expect("Failed to set type");
    }
    match parent {
        Some(parent) => ctx.add_child(parent, id),
        None => ctx.add_top_node(module, id),
    }
    .expect("Failed to link node");
    id
}

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::max())
        .init();
    Context::set_log_level_debug();

    // Initialize context.
    let mut ctx = Context::new(ContextFlags::empty());
    let module = ctx
        .add_module(MODULE_NAME, Some("2024-01-01"))
        .expect("Failed to add module");
    let mdata = ctx.module_mut(module).expect("Failed to get module");
    mdata.namespace = Some("urn:example:interfaces".to_owned());
    mdata.prefix = Some("if".to_owned());

    // grouping counters { leaf in-octets; leaf out-octets; }
    let grouping = ctx
        .add_grouping(
            GroupingOwner::Module(module),
            Grouping {
                name: "counters".to_owned(),
                ..Default::default()
            },
        )
        .expect("Failed to add grouping");
    for name in ["in-octets", "out-octets"] {
        let leaf = ctx
            .new_node(module, ObjectKind::Leaf, name)
            .expect("Failed to create node");
        ctx.add_grouping_node(grouping, leaf)
            .expect("Failed to add grouping member");
    }

    // container interfaces { list interface { key name; leaf name;
    //   container statistics { uses counters; } } }
    let interfaces =
        add(&mut ctx, module, None, ObjectKind::Container, "interfaces");
    let interface =
        add(&mut ctx, module, Some(interfaces), ObjectKind::List, "interface");
    add(&mut ctx, module, Some(interface), ObjectKind::Leaf, "name");
    let statistics = add(
        &mut ctx,
        module,
        Some(interface),
        ObjectKind::Container,
        "statistics",
    );
    ctx.node_mut(statistics)
        .expect("Failed to get node")
        .set_config(false)
        .expect("Failed to set config");
    let uses =
        add(&mut ctx, module, Some(statistics), ObjectKind::Uses, "counters");
    ctx.expand_uses(uses).expect("Failed to expand uses");
    ctx.node_mut(interface)
        .expect("Failed to get node")
        .set_keystr("name")
        .expect("Failed to set key");
    ctx.resolve_list(interface).expect("Failed to resolve list");

    // Iterate over all schema nodes that belong to the module and print
    // their object identifiers.
    println!("Data (DFS iteration):");
    for snode in ctx
        .traverse()
        .filter(|snode| snode.module_name() == Some(MODULE_NAME))
    {
        println!(
            "  {} (config: {}, mandatory: {})",
            snode.gen_object_id(&ObjectIdOptions::xpath()),
            snode.is_config(),
            snode.is_mandatory()
        );
    }

    println!("Capability:");
    println!(
        "  {}",
        ctx.module(module)
            .expect("Failed to get module")
            .capability_uri()
    );
}
