//! Expand/collapse state of one chart view.
//!
//! A [`ViewState`] remembers which nodes are expanded and which nodes exist in
//! the tree it was initialized from. Toggling keeps node identities intact, so
//! the presentation layer can measure a node before and after a toggle and
//! keep it anchored on screen.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

use crate::employee::model::Employee;
use crate::org_chart::model::{walk, NodeId, OrgChartNode};
use crate::org_chart::tree::{
    build_employee_tree_report, build_grouped_employee_tree_report, TreeAnomalies,
};

/// Depth (0 = roots) down to which a fresh view is expanded.
const INITIAL_EXPANSION_DEPTH: usize = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded: HashSet<NodeId>,
    known: HashSet<NodeId>,
}

impl ViewState {
    /// Default view of a freshly built tree: roots and their direct children
    /// are expanded. For a grouped tree that is every department node and its
    /// local roots; for a flat tree every root and its direct reports.
    pub fn initialize(nodes: &[OrgChartNode]) -> Self {
        let mut state = Self::default();
        walk(nodes, &mut |node, depth, _| {
            state.known.insert(node.id().clone());
            if depth <= INITIAL_EXPANSION_DEPTH {
                state.expanded.insert(node.id().clone());
            }
        });
        state
    }

    /// Flips the expansion of `id`. Descendant entries are left alone, so a
    /// collapsed subtree comes back exactly as it was. Ids that are not part
    /// of the tree are ignored; returns whether anything changed.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        if !self.known.contains(id) {
            log::debug!("Ignoring toggle of unknown chart node {}", id);
            return false;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
        true
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.contains(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.known.contains(id)
    }

    pub fn expand_all(&mut self) {
        self.expanded = self.known.clone();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expanded ids in a stable order.
    pub fn expanded_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.expanded.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Carries expansion over to a rebuilt tree. Entries for nodes that no
    /// longer exist are dropped; new nodes start collapsed.
    pub fn retain_for(&self, nodes: &[OrgChartNode]) -> Self {
        let mut state = Self::default();
        walk(nodes, &mut |node, _, _| {
            state.known.insert(node.id().clone());
            if self.expanded.contains(node.id()) {
                state.expanded.insert(node.id().clone());
            }
        });
        state
    }
}

pub fn initialize(nodes: &[OrgChartNode]) -> ViewState {
    ViewState::initialize(nodes)
}

/// Value-style toggle: returns the new state and leaves `state` untouched.
pub fn toggle(state: &ViewState, id: &NodeId) -> ViewState {
    let mut next = state.clone();
    next.toggle(id);
    next
}

/// A node the rendering layer should draw.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VisibleNode {
    pub id: NodeId,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub expanded: bool,
    pub has_children: bool,
}

/// Visible nodes in render order. Roots are always visible; children are
/// visible while every ancestor is expanded.
pub fn visible_nodes(nodes: &[OrgChartNode], state: &ViewState) -> Vec<VisibleNode> {
    let mut out = Vec::new();
    let mut stack: Vec<(&OrgChartNode, usize, Option<&NodeId>)> =
        nodes.iter().rev().map(|node| (node, 0, None)).collect();

    while let Some((node, depth, parent)) = stack.pop() {
        let expanded = state.is_expanded(node.id());
        out.push(VisibleNode {
            id: node.id().clone(),
            depth,
            parent: parent.cloned(),
            expanded,
            has_children: !node.direct_reports().is_empty(),
        });
        if expanded {
            stack.extend(
                node.direct_reports()
                    .iter()
                    .rev()
                    .map(|child| (child, depth + 1, Some(node.id()))),
            );
        }
    }
    out
}

/// Which department's employees feed the chart.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentFilter {
    #[default]
    All,
    Department(String),
    Unassigned,
}

impl DepartmentFilter {
    /// Parses a query value: absent or `all` selects everything, `unassigned`
    /// selects employees without a department, anything else is a department id.
    /// Node id form is accepted too, so `department:unassigned` selects a real
    /// department whose id is `unassigned`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => DepartmentFilter::All,
            Some(value) => match value.parse::<NodeId>() {
                Ok(NodeId::Unassigned) => DepartmentFilter::Unassigned,
                Ok(NodeId::Department(id)) => DepartmentFilter::Department(id),
                Ok(NodeId::Employee(_)) | Err(_) => DepartmentFilter::Department(value.to_string()),
            },
        }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Department(id) => employee.department_key() == Some(id.as_str()),
            DepartmentFilter::Unassigned => employee.department_key().is_none(),
        }
    }

    pub fn apply(&self, employees: &[Employee]) -> Vec<Employee> {
        employees
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartLayout {
    #[default]
    Grouped,
    Flat,
}

/// A built chart: nodes plus the anomalies found while building them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTree {
    pub nodes: Vec<OrgChartNode>,
    pub anomalies: TreeAnomalies,
}

impl ChartTree {
    pub fn build(
        employees: &[Employee],
        filter: &DepartmentFilter,
        layout: ChartLayout,
        department_names: &HashMap<String, String>,
    ) -> Self {
        let selected = filter.apply(employees);
        let (nodes, anomalies) = match layout {
            ChartLayout::Grouped => {
                let build = build_grouped_employee_tree_report(&selected, department_names);
                (build.nodes, build.anomalies)
            }
            ChartLayout::Flat => {
                let build = build_employee_tree_report(&selected);
                let nodes = build.nodes.into_iter().map(OrgChartNode::from).collect();
                (nodes, build.anomalies)
            }
        };
        if !anomalies.is_empty() {
            log::warn!(
                "Org chart built with anomalies: {} duplicate, {} orphaned, {} cycle-broken",
                anomalies.duplicate_ids.len(),
                anomalies.orphan_ids.len(),
                anomalies.cycle_broken_ids.len()
            );
        }
        Self { nodes, anomalies }
    }
}

/// One chart view instance: the listing it was built from, the active
/// filter, the built tree and its expansion state.
#[derive(Debug, Clone)]
pub struct ChartView {
    employees: Vec<Employee>,
    department_names: HashMap<String, String>,
    filter: DepartmentFilter,
    layout: ChartLayout,
    tree: ChartTree,
    state: ViewState,
}

impl ChartView {
    pub fn new(employees: Vec<Employee>, filter: DepartmentFilter, layout: ChartLayout) -> Self {
        Self::with_department_names(employees, HashMap::new(), filter, layout)
    }

    pub fn with_department_names(
        employees: Vec<Employee>,
        department_names: HashMap<String, String>,
        filter: DepartmentFilter,
        layout: ChartLayout,
    ) -> Self {
        let tree = ChartTree::build(&employees, &filter, layout, &department_names);
        let state = ViewState::initialize(&tree.nodes);
        Self {
            employees,
            department_names,
            filter,
            layout,
            tree,
            state,
        }
    }

    pub fn nodes(&self) -> &[OrgChartNode] {
        &self.tree.nodes
    }

    pub fn anomalies(&self) -> &TreeAnomalies {
        &self.tree.anomalies
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn filter(&self) -> &DepartmentFilter {
        &self.filter
    }

    pub fn layout(&self) -> ChartLayout {
        self.layout
    }

    pub fn toggle(&mut self, id: &NodeId) -> bool {
        self.state.toggle(id)
    }

    pub fn visible_nodes(&self) -> Vec<VisibleNode> {
        visible_nodes(&self.tree.nodes, &self.state)
    }

    /// Switches the department filter. A different filter rebuilds the tree
    /// and starts over from the default expansion; node identities are not
    /// comparable across filters, so nothing of the old state is kept.
    /// Returns whether the view was rebuilt.
    pub fn set_filter(&mut self, filter: DepartmentFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        log::debug!("Chart filter changed from {:?} to {:?}", self.filter, filter);
        self.filter = filter;
        self.rebuild_fresh();
        true
    }

    pub fn set_layout(&mut self, layout: ChartLayout) -> bool {
        if layout == self.layout {
            return false;
        }
        self.layout = layout;
        self.rebuild_fresh();
        true
    }

    /// Replaces the listing after a refetch under the same filter. Expansion
    /// of nodes that survive the rebuild is kept.
    pub fn refresh(&mut self, employees: Vec<Employee>) {
        self.employees = employees;
        self.tree = ChartTree::build(
            &self.employees,
            &self.filter,
            self.layout,
            &self.department_names,
        );
        self.state = self.state.retain_for(&self.tree.nodes);
    }

    /// Back to the default expansion of the current tree.
    pub fn reset(&mut self) {
        self.state = ViewState::initialize(&self.tree.nodes);
    }

    fn rebuild_fresh(&mut self) {
        self.tree = ChartTree::build(
            &self.employees,
            &self.filter,
            self.layout,
            &self.department_names,
        );
        self.state = ViewState::initialize(&self.tree.nodes);
    }
}
