//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! YANG schema data.

use std::sync::Arc;

use crate::context::Context;
use crate::feature::{Feature, FeatureRef, IfFeature};
use crate::iter::{Ancestors, NodeIterable, Siblings, Traverse};
use crate::list::ValueList;
use crate::module::{Import, Include, ModuleData};
use crate::object::{
    Grouping, Metadata, ObjectDef, ObjectFlags, ObjectKind, ObjectTemplate,
};
use crate::types::{
    Access, AppInfo, BaseType, ModuleId, Must, NodeId, SourceLocation, Status,
    TypeDef, Typedef, XPathExpr,
};
use crate::utils::Binding;

/// Name of the extension carrying an alternate node name.
const ALT_NAME: &str = "alt-name";

/// Available YANG schema tree structures representing YANG module.
#[derive(Clone, Debug)]
pub struct SchemaModule<'a> {
    context: &'a Context,
    id: ModuleId,
    data: &'a ModuleData,
}

/// Generic YANG schema node.
#[derive(Clone, Debug)]
pub struct SchemaNode<'a> {
    context: &'a Context,
    id: NodeId,
    obj: &'a ObjectTemplate,
}

// ===== impl SchemaModule =====

impl<'a> SchemaModule<'a> {
    pub(crate) fn context(&self) -> &'a Context {
        self.context
    }

    /// Registry identifier of the module.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Name of the module.
    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    /// Revision of the module.
    pub fn revision(&self) -> Option<&'a str> {
        self.data.revision.as_deref()
    }

    /// Namespace of the module. Submodules use their main module's
    /// namespace.
    pub fn namespace(&self) -> Option<&'a str> {
        self.data
            .namespace
            .as_deref()
            .or_else(|| self.main_module().and_then(|main| main.namespace()))
    }

    /// Prefix of the module.
    pub fn prefix(&self) -> Option<&'a str> {
        self.data
            .prefix
            .as_deref()
            .or_else(|| self.main_module().and_then(|main| main.prefix()))
    }

    /// Prefix used to qualify names in XPath expressions.
    pub fn xmlprefix(&self) -> Option<&'a str> {
        match self.main_module() {
            Some(main) => self.data.xpath_prefix().or_else(|| main.xmlprefix()),
            None => self.data.xpath_prefix(),
        }
    }

    /// Party/company responsible for the module.
    pub fn organization(&self) -> Option<&'a str> {
        self.data.organization.as_deref()
    }

    /// Contact information for the module.
    pub fn contact(&self) -> Option<&'a str> {
        self.data.contact.as_deref()
    }

    /// Description of the module.
    pub fn description(&self) -> Option<&'a str> {
        self.data.description.as_deref()
    }

    /// Cross-reference for the module.
    pub fn reference(&self) -> Option<&'a str> {
        self.data.reference.as_deref()
    }

    /// Source file the module was read from.
    pub fn source(&self) -> Option<&'a str> {
        self.data.source.as_deref()
    }

    /// Main module named in the `belongs-to` statement of a submodule.
    pub fn belongs_to(&self) -> Option<&'a str> {
        self.data.belongs_to.as_deref()
    }

    /// Returns whether this is a main module rather than a submodule.
    pub fn is_module(&self) -> bool {
        self.data.is_module
    }

    /// Namespace identifier shared by a module and its submodules.
    pub fn nsid(&self) -> u32 {
        self.data.nsid
    }

    /// Main module of a submodule.
    pub fn main_module(&self) -> Option<SchemaModule<'a>> {
        SchemaModule::from_id_opt(self.context, self.data.parent)
    }

    /// Name of the main module (the module itself for a main module).
    pub fn main_module_name(&self) -> &'a str {
        match self.main_module() {
            Some(main) => main.name(),
            None => self.name(),
        }
    }

    pub fn imports(&self) -> &'a [Import] {
        &self.data.imports
    }

    pub fn includes(&self) -> &'a [Include] {
        &self.data.includes
    }

    /// Returns an iterator over the registered submodules named in the
    /// `include` statements.
    pub fn submodules(&self) -> impl Iterator<Item = SchemaModule<'a>> + 'a {
        let context = self.context;
        context
            .included_submodules(self.id)
            .into_iter()
            .filter_map(move |id| SchemaModule::from_id(context, id))
    }

    pub fn typedefs(&self) -> &'a [Typedef] {
        &self.data.typedefs
    }

    pub fn groupings(&self) -> &'a [Grouping] {
        &self.data.groupings
    }

    /// Features defined in this module itself.
    pub fn features(&self) -> &'a [Feature] {
        &self.data.features
    }

    /// Returns whether the named feature of this module is enabled.
    pub fn feature_value(&self, feature: &str) -> Option<bool> {
        let index = self.data.features.iter().position(|f| f.name == feature)?;
        Some(self.context.feature_enabled(FeatureRef {
            module: self.id,
            index,
        }))
    }

    /// Returns an iterator over the enabled features of the module and its
    /// included submodules, in definition order.
    pub fn enabled_features(&self) -> impl Iterator<Item = &'a Feature> + 'a {
        let context = self.context;
        let mut owners = vec![self.id];
        owners.extend(context.included_submodules(self.id));
        owners.into_iter().flat_map(move |module| {
            let features = context
                .module_data(module)
                .map(|mdata| mdata.features.as_slice())
                .unwrap_or_default();
            features.iter().enumerate().filter_map(move |(index, feature)| {
                context
                    .feature_enabled(FeatureRef { module, index })
                    .then_some(feature)
            })
        })
    }

    /// Modules carrying deviations for this module.
    pub fn deviations(&self) -> &'a ValueList {
        &self.data.deviations
    }

    pub fn appinfo(&self) -> &'a [AppInfo] {
        &self.data.appinfo
    }

    /// Returns an iterator over the top-level data nodes.
    pub fn data(&self) -> Siblings<'a, SchemaNode<'a>> {
        Siblings::new(self.context, &self.data.datadefs)
    }

    /// Returns an iterator over all top-level nodes and their descendants
    /// (depth-first search algorithm).
    pub fn traverse(&self) -> impl Iterator<Item = SchemaNode<'a>> {
        self.data().flat_map(|snode| snode.traverse())
    }

    /// Build the NETCONF capability URI announcing this module.
    ///
    /// The form is
    /// `namespace?module=name&revision=date&features=f1,f2&deviations=d1,d2`
    /// where the last three parts are left out when empty.
    pub fn capability_uri(&self) -> String {
        let mut uri = format!(
            "{}?module={}",
            self.namespace().unwrap_or_default(),
            self.name()
        );
        if let Some(revision) = self.revision() {
            uri.push_str("&revision=");
            uri.push_str(revision);
        }

        let features = self
            .enabled_features()
            .map(|feature| feature.name.as_str())
            .collect::<Vec<_>>();
        if !features.is_empty() {
            uri.push_str("&features=");
            uri.push_str(&features.join(","));
        }

        let deviations = self.deviations().strings().collect::<Vec<_>>();
        if !deviations.is_empty() {
            uri.push_str("&deviations=");
            uri.push_str(&deviations.join(","));
        }
        uri
    }
}

impl<'a> Binding<'a> for SchemaModule<'a> {
    type Id = ModuleId;
    type Container = Context;

    fn from_id(context: &'a Context, id: ModuleId) -> Option<SchemaModule<'a>> {
        let data = context.module_data(id).ok()?;
        Some(SchemaModule { context, id, data })
    }
}

impl PartialEq for SchemaModule<'_> {
    fn eq(&self, other: &SchemaModule<'_>) -> bool {
        std::ptr::eq(self.context, other.context) && self.id == other.id
    }
}

// ===== impl SchemaNode =====

impl<'a> SchemaNode<'a> {
    pub(crate) fn context(&self) -> &'a Context {
        self.context
    }

    /// Arena identifier of the node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying node record.
    pub fn template(&self) -> &'a ObjectTemplate {
        self.obj
    }

    /// Schema node module.
    pub fn module(&self) -> Option<SchemaModule<'a>> {
        SchemaModule::from_id(self.context, self.obj.module)
    }

    /// Name of the main module owning the node.
    pub fn module_name(&self) -> Option<&'a str> {
        self.module().map(|module| module.main_module_name())
    }

    /// Prefix of the module owning the node.
    pub fn module_prefix(&self) -> Option<&'a str> {
        self.module().and_then(|module| module.prefix())
    }

    /// XML prefix of the module owning the node.
    pub fn module_xmlprefix(&self) -> Option<&'a str> {
        self.module().and_then(|module| module.xmlprefix())
    }

    /// Namespace identifier of the node.
    pub fn nsid(&self) -> u32 {
        self.obj.nsid
    }

    /// Returns the kind of the schema node.
    pub fn kind(&self) -> ObjectKind {
        self.obj.kind()
    }

    pub fn flags(&self) -> ObjectFlags {
        self.obj.flags
    }

    /// Location of the defining statement.
    pub fn location(&self) -> SourceLocation {
        self.obj.tkerr
    }

    /// Schema node name. Uses, augment and refine nodes have none.
    pub fn name(&self) -> Option<&'a str> {
        self.obj.def.name()
    }

    pub fn has_name(&self) -> bool {
        self.name().is_some()
    }

    pub fn status(&self) -> Status {
        self.obj.def.status()
    }

    pub fn description(&self) -> Option<&'a str> {
        self.obj.def.description()
    }

    pub fn reference(&self) -> Option<&'a str> {
        self.obj.def.reference()
    }

    pub fn presence(&self) -> Option<&'a str> {
        self.obj.def.presence()
    }

    /// Default value of a leaf or default case name of a choice.
    pub fn default(&self) -> Option<&'a str> {
        self.obj.def.default()
    }

    pub fn units(&self) -> Option<&'a str> {
        self.obj.def.units()
    }

    /// Type definition of a leaf, leaf-list or anyxml.
    pub fn typdef(&self) -> Option<&'a Arc<TypeDef>> {
        self.obj.def.typdef()
    }

    /// Base type of the node.
    ///
    /// Leafy nodes report the base type of their type definition; the
    /// structural kinds report their own pseudo base type.
    pub fn basetype(&self) -> BaseType {
        match &self.obj.def {
            ObjectDef::Container(_) => BaseType::Container,
            ObjectDef::List(_) => BaseType::List,
            ObjectDef::Choice(_) => BaseType::Choice,
            ObjectDef::Case(_) => BaseType::Case,
            def => def
                .typdef()
                .map(|typdef| typdef.basetype())
                .unwrap_or(BaseType::None),
        }
    }

    pub fn min_elements(&self) -> Option<u32> {
        self.obj.def.min_elements()
    }

    pub fn max_elements(&self) -> Option<u32> {
        self.obj.def.max_elements()
    }

    /// Key statement of a list.
    pub fn keystr(&self) -> Option<&'a str> {
        match &self.obj.def {
            ObjectDef::List(list) => list.keystr.as_deref(),
            _ => None,
        }
    }

    /// Returns an iterator over the resolved key leaves of a list.
    pub fn list_keys(&self) -> impl Iterator<Item = SchemaNode<'a>> + 'a {
        let context = self.context;
        let keys: &'a [NodeId] = match &self.obj.def {
            ObjectDef::List(list) => &list.keys,
            _ => &[],
        };
        keys.iter().filter_map(move |id| SchemaNode::from_id(context, *id))
    }

    /// Default case of a choice.
    pub fn default_case(&self) -> Option<SchemaNode<'a>> {
        if self.kind() != ObjectKind::Choice {
            return None;
        }
        let default = self.default()?;
        self.children().find(|case| case.name() == Some(default))
    }

    /// Child queue of the node. Choices return their cases.
    pub fn datadefs(&self) -> &'a [NodeId] {
        self.obj.def.datadefs()
    }

    /// Must statements; empty for kinds without them.
    pub fn musts(&self) -> &'a [Must] {
        self.obj.def.musts()
    }

    pub fn when(&self) -> Option<&'a XPathExpr> {
        self.obj.when.as_ref()
    }

    /// When statements inherited from expanded uses and augments.
    pub fn inherited_whens(&self) -> &'a [XPathExpr] {
        &self.obj.inherited_whens
    }

    pub fn appinfo(&self) -> &'a [AppInfo] {
        &self.obj.appinfo
    }

    /// Find an extension statement by optional prefix and name.
    pub fn find_appinfo(
        &self,
        prefix: Option<&str>,
        name: &str,
    ) -> Option<&'a AppInfo> {
        self.obj.appinfo.iter().find(|appinfo| {
            appinfo.name == name
                && prefix.is_none_or(|p| appinfo.prefix.as_deref() == Some(p))
        })
    }

    /// Value of the `alt-name` extension.
    pub fn alt_name(&self) -> Option<&'a str> {
        self.find_appinfo(None, ALT_NAME)
            .and_then(|appinfo| appinfo.value.as_deref())
    }

    pub fn iffeatures(&self) -> &'a [IfFeature] {
        &self.obj.iffeatures
    }

    /// If-feature statements inherited from expanded uses and augments.
    pub fn inherited_iffeatures(&self) -> &'a [IfFeature] {
        &self.obj.inherited_iffeatures
    }

    pub fn metadata(&self) -> &'a [Metadata] {
        &self.obj.metadata
    }

    pub fn find_metadata(&self, name: &str) -> Option<&'a Metadata> {
        self.obj.metadata.iter().find(|meta| meta.name == name)
    }

    /// Uses node a clone was expanded from.
    pub fn uses_obj(&self) -> Option<SchemaNode<'a>> {
        SchemaNode::from_id_opt(self.context, self.obj.uses_obj)
    }

    /// Augment node a clone was added by.
    pub fn aug_obj(&self) -> Option<SchemaNode<'a>> {
        SchemaNode::from_id_opt(self.context, self.obj.aug_obj)
    }

    pub fn parent(&self) -> Option<SchemaNode<'a>> {
        SchemaNode::from_id_opt(self.context, self.obj.parent)
    }

    /// Parent node, skipping choice and case layers.
    pub fn real_parent(&self) -> Option<SchemaNode<'a>> {
        self.ancestors()
            .find(|parent| !parent.kind().is_choice_or_case())
    }

    /// Nesting level of the node; top-level nodes are at level 1.
    ///
    /// Choice and case layers are not counted.
    pub fn level(&self) -> u32 {
        1 + self
            .ancestors()
            .filter(|parent| !parent.kind().is_choice_or_case())
            .count() as u32
    }

    /// Find a typedef visible from this node.
    pub fn find_typedef(&self, qname: &str) -> Option<&'a Typedef> {
        self.context.lookup_typedef(self.id, qname)
    }

    /// Find a grouping visible from this node.
    pub fn find_grouping(&self, qname: &str) -> Option<&'a Grouping> {
        let grouping = self.context.find_grouping(self.id, qname).ok()?;
        self.context.grouping(grouping).ok()
    }

    /// Number of named nodes in the child queue.
    pub fn child_count(&self) -> usize {
        self.children().filter(|child| child.has_name()).count()
    }

    /// Number of named and enabled nodes in the child queue.
    pub fn enabled_child_count(&self) -> usize {
        self.children()
            .filter(|child| child.has_name() && child.is_enabled())
            .count()
    }

    /// Returns whether the node's status is "current".
    pub fn is_status_current(&self) -> bool {
        matches!(self.status(), Status::Current | Status::None)
    }

    /// Returns whether the node's status is "deprecated".
    pub fn is_status_deprecated(&self) -> bool {
        self.status() == Status::Deprecated
    }

    /// Returns whether the node's status is "obsolete".
    pub fn is_status_obsolete(&self) -> bool {
        self.status() == Status::Obsolete
    }

    /// Returns whether the node is a configuration node.
    pub fn is_config(&self) -> bool {
        self.config_flag_deep()
    }

    /// Effective config value of the node.
    ///
    /// An explicit `config` statement wins, otherwise the value is
    /// inherited. Returns `None` for uses, augment and refine nodes, which
    /// have no config value.
    pub fn config_flag(&self) -> Option<bool> {
        match self.kind() {
            ObjectKind::Uses | ObjectKind::Augment | ObjectKind::Refine => None,
            _ => Some(self.config_flag_deep()),
        }
    }

    /// Config value found by walking up to the first node with an explicit
    /// value, or `true` at the root.
    pub fn config_flag_deep(&self) -> bool {
        for node in self.inclusive_ancestors() {
            if let Some(config) = node.local_config() {
                return config;
            }
        }
        true
    }

    /// Config value used while checking a module.
    ///
    /// Nodes flagged as `root` are never config. Returns `None` when the
    /// walk reaches the top of a grouping without an explicit value.
    pub fn config_flag_check(&self) -> Option<bool> {
        if self.obj.flags.contains(ObjectFlags::ROOT) {
            return Some(false);
        }
        let mut last = self.clone();
        for node in self.inclusive_ancestors() {
            if let Some(config) = node.local_config() {
                return Some(config);
            }
            last = node;
        }
        if last.obj.in_grouping.is_some() {
            return None;
        }
        Some(true)
    }

    /// Config value fixed by the node itself, if any.
    fn local_config(&self) -> Option<bool> {
        if self.obj.flags.contains(ObjectFlags::CONFSET) {
            return Some(self.obj.flags.contains(ObjectFlags::CONFIG));
        }
        match self.kind() {
            // Input parameters are writable; everything else in an rpc
            // or notification is not.
            ObjectKind::Rpc => Some(true),
            ObjectKind::RpcIo => Some(self.name() == Some("input")),
            ObjectKind::Notification => Some(false),
            _ => None,
        }
    }

    /// Maximum access for the node, from the nearest explicit `config`
    /// statement.
    pub fn max_access(&self) -> Access {
        self.inclusive_ancestors()
            .find(|node| node.obj.flags.contains(ObjectFlags::CONFSET))
            .map(|node| {
                if node.obj.flags.contains(ObjectFlags::CONFIG) {
                    Access::ReadCreate
                } else {
                    Access::ReadOnly
                }
            })
            .unwrap_or(Access::ReadCreate)
    }

    /// Returns whether the node is mandatory.
    pub fn is_mandatory(&self) -> bool {
        match self.kind() {
            ObjectKind::Container => {
                self.presence().is_none()
                    && self.children().any(|child| child.is_mandatory())
            }
            ObjectKind::Case | ObjectKind::RpcIo => {
                self.children().any(|child| child.is_mandatory())
            }
            ObjectKind::Leaf if self.obj.flags.contains(ObjectFlags::KEY) => {
                true
            }
            ObjectKind::Leaf | ObjectKind::Anyxml | ObjectKind::Choice => {
                self.obj.flags.contains(ObjectFlags::MANDATORY)
            }
            ObjectKind::LeafList | ObjectKind::List => {
                self.min_elements().unwrap_or(0) > 0
            }
            ObjectKind::Uses
            | ObjectKind::Augment
            | ObjectKind::Refine
            | ObjectKind::Rpc
            | ObjectKind::Notification => false,
        }
    }

    /// Returns whether the node is mandatory without any `when` condition.
    ///
    /// Nodes with a `when` statement of their own or inherited are only
    /// conditionally present and are never reported. With `config_only`
    /// set, non-config nodes are never reported.
    pub fn is_mandatory_when(&self, config_only: bool) -> bool {
        if config_only && !self.is_config() {
            return false;
        }
        if self.obj.when.is_some() || !self.obj.inherited_whens.is_empty() {
            return false;
        }
        match self.kind() {
            ObjectKind::Container => {
                self.presence().is_none()
                    && self
                        .children()
                        .any(|child| child.is_mandatory_when(config_only))
            }
            ObjectKind::Case | ObjectKind::RpcIo => self
                .children()
                .any(|child| child.is_mandatory_when(config_only)),
            _ => self.is_mandatory(),
        }
    }

    /// Returns whether every if-feature of the node and of its ancestors
    /// is enabled.
    ///
    /// The walk does not stop at the first ancestor that is not a choice or
    /// case: a node under a disabled container of any kind is disabled too,
    /// and child lookups that skip disabled nodes do not find it.
    pub fn is_enabled(&self) -> bool {
        self.inclusive_ancestors()
            .all(|node| node.own_features_enabled())
    }

    fn own_features_enabled(&self) -> bool {
        self.obj
            .iffeatures
            .iter()
            .chain(self.obj.inherited_iffeatures.iter())
            .all(|iff| self.context.iffeature_enabled(iff))
    }

    /// Returns whether the node is a non-presence container.
    pub fn is_np_container(&self) -> bool {
        self.kind() == ObjectKind::Container && self.presence().is_none()
    }

    /// Returns whether at most one instance of the node can exist.
    pub fn is_single_instance(&self) -> bool {
        !self.inclusive_ancestors().any(|node| {
            matches!(node.kind(), ObjectKind::List | ObjectKind::LeafList)
        })
    }

    /// Number of key leaves of this node and its ancestor lists.
    pub fn key_count_to_root(&self) -> usize {
        self.inclusive_ancestors()
            .map(|node| node.list_keys().count())
            .sum()
    }

    /// Returns whether the node is defined outside any rpc or
    /// notification.
    pub fn is_data(&self) -> bool {
        !self.inclusive_ancestors().any(|node| {
            matches!(
                node.kind(),
                ObjectKind::Rpc | ObjectKind::RpcIo | ObjectKind::Notification
            )
        })
    }

    /// Returns whether the node can appear in a configuration datastore.
    pub fn is_data_db(&self) -> bool {
        if self
            .obj
            .flags
            .intersects(ObjectFlags::ABSTRACT | ObjectFlags::CLI)
        {
            return false;
        }
        match self.kind() {
            ObjectKind::Uses
            | ObjectKind::Augment
            | ObjectKind::Refine
            | ObjectKind::Rpc
            | ObjectKind::RpcIo
            | ObjectKind::Notification => false,
            _ => self.is_data(),
        }
    }

    fn in_rpcio(&self, name: &str) -> bool {
        self.inclusive_ancestors().any(|node| {
            node.kind() == ObjectKind::RpcIo && node.name() == Some(name)
        })
    }

    /// Returns whether the node is in the subtree of an rpc input.
    pub fn in_rpc(&self) -> bool {
        self.in_rpcio("input")
    }

    /// Returns whether the node is in the subtree of an rpc output.
    pub fn in_rpc_reply(&self) -> bool {
        self.in_rpcio("output")
    }

    /// Returns whether the node is in the subtree of a notification.
    pub fn in_notif(&self) -> bool {
        self.inclusive_ancestors()
            .any(|node| node.kind() == ObjectKind::Notification)
    }

    /// Returns whether any `when` statement applies to the node, including
    /// those of enclosing choice and case nodes.
    pub fn has_when_stmts(&self) -> bool {
        let has_when = |node: &SchemaNode<'_>| {
            node.obj.when.is_some() || !node.obj.inherited_whens.is_empty()
        };
        if has_when(self) {
            return true;
        }
        self.ancestors()
            .take_while(|parent| parent.kind().is_choice_or_case())
            .any(|parent| has_when(&parent))
    }

    /// Returns whether the node is a case holding exactly one data node
    /// that carries the case's name.
    pub fn is_short_case(&self) -> bool {
        let ObjectDef::Case(case) = &self.obj.def else {
            return false;
        };
        if case.datadefs.len() != 1 {
            return false;
        }
        case.nameclone
            || self.children().next().and_then(|child| child.name())
                == Some(case.name.as_str())
    }

    /// Returns whether the node has any named and enabled child.
    pub fn has_children(&self) -> bool {
        self.enabled_child_count() > 0
    }

    /// Returns whether any enabled child, seen through choice and case
    /// layers, is read-only.
    pub fn has_ro_children(&self) -> bool {
        self.children().any(|child| {
            if !child.has_name() || !child.is_enabled() {
                return false;
            }
            if child.kind().is_choice_or_case() {
                return child.has_ro_children();
            }
            child.is_data_db() && !child.is_config()
        })
    }

    /// Returns whether the node is a leaf or leaf-list.
    pub fn is_leafy(&self) -> bool {
        matches!(self.kind(), ObjectKind::Leaf | ObjectKind::LeafList)
    }

    /// Returns whether a list or leaf-list is ordered by the system.
    /// Other kinds are always system ordered.
    pub fn is_system_ordered(&self) -> bool {
        match &self.obj.def {
            ObjectDef::List(list) => list.ordersys,
            ObjectDef::LeafList(leaflist) => leaflist.ordersys,
            _ => true,
        }
    }

    /// Returns whether the node is a key leaf of a list.
    pub fn is_list_key(&self) -> bool {
        self.obj.flags.contains(ObjectFlags::KEY)
    }

    /// Returns whether the node is a top-level node of its module.
    pub fn is_top(&self) -> bool {
        self.obj.flags.contains(ObjectFlags::TOP)
    }

    /// Returns an iterator over the ancestor schema nodes.
    pub fn ancestors(&self) -> Ancestors<'a, SchemaNode<'a>> {
        let parent = self.parent();
        Ancestors::new(parent)
    }

    /// Returns an iterator over this schema node and its ancestors.
    pub fn inclusive_ancestors(&self) -> Ancestors<'a, SchemaNode<'a>> {
        Ancestors::new(Some(self.clone()))
    }

    /// Returns an iterator over the sibling schema nodes.
    pub fn siblings(&self) -> Siblings<'a, SchemaNode<'a>> {
        let queue = self.owner_queue();
        let next = queue
            .iter()
            .position(|id| *id == self.id)
            .map_or(queue.len(), |pos| pos + 1);
        Siblings::new(self.context, &queue[next..])
    }

    /// Returns an iterator over this schema node and its siblings.
    pub fn inclusive_siblings(&self) -> Siblings<'a, SchemaNode<'a>> {
        let queue = self.owner_queue();
        match queue.iter().position(|id| *id == self.id) {
            Some(pos) => Siblings::new(self.context, &queue[pos..]),
            None => Siblings::single(self.clone()),
        }
    }

    /// Returns an iterator over the child schema nodes.
    pub fn children(&self) -> Siblings<'a, SchemaNode<'a>> {
        Siblings::new(self.context, self.obj.def.datadefs())
    }

    /// Returns an iterator over all elements in the schema tree (depth-first
    /// search algorithm).
    pub fn traverse(&self) -> Traverse<'a, SchemaNode<'a>> {
        Traverse::new(self.clone())
    }

    /// Queue holding this node: the parent's children, the module's
    /// top-level nodes or a grouping body.
    fn owner_queue(&self) -> &'a [NodeId] {
        if let Some(parent) = self.obj.parent {
            return self
                .context
                .template_opt(parent)
                .map(|pobj| pobj.def.datadefs())
                .unwrap_or_default();
        }
        if self.obj.flags.contains(ObjectFlags::TOP) {
            return self
                .context
                .module_data(self.obj.module)
                .map(|mdata| mdata.datadefs.as_slice())
                .unwrap_or_default();
        }
        match self.obj.in_grouping {
            Some(grouping) => self
                .context
                .grouping(grouping)
                .map(|grp| grp.datadefs.as_slice())
                .unwrap_or_default(),
            None => &[],
        }
    }
}

impl<'a> Binding<'a> for SchemaNode<'a> {
    type Id = NodeId;
    type Container = Context;

    fn from_id(context: &'a Context, id: NodeId) -> Option<SchemaNode<'a>> {
        let obj = context.template_opt(id)?;
        Some(SchemaNode { context, id, obj })
    }
}

impl<'a> NodeIterable<'a> for SchemaNode<'a> {
    fn context(&self) -> &'a Context {
        self.context
    }

    fn parent(&self) -> Option<SchemaNode<'a>> {
        SchemaNode::parent(self)
    }

    fn child_ids(&self) -> &'a [NodeId] {
        self.obj.def.datadefs()
    }
}

impl PartialEq for SchemaNode<'_> {
    fn eq(&self, other: &SchemaNode<'_>) -> bool {
        std::ptr::eq(self.context, other.context) && self.id == other.id
    }
}
