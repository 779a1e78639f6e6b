use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::employee::model::Employee;

const EMPLOYEE_PREFIX: &str = "employee:";
const DEPARTMENT_PREFIX: &str = "department:";
const UNASSIGNED: &str = "unassigned";

/// Display name of the sentinel group holding employees without a department.
pub const UNASSIGNED_DEPARTMENT_NAME: &str = "Unassigned";

/// Stable identity of a chart node.
///
/// Employee and department ids live in separate namespaces, so a department
/// and an employee sharing a raw id never collide inside one tree. On the
/// wire a node id is a single string such as `employee:e-17`,
/// `department:eng` or `unassigned`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NodeId {
    Employee(String),
    Department(String),
    Unassigned,
}

impl NodeId {
    pub fn employee(id: impl Into<String>) -> Self {
        NodeId::Employee(id.into())
    }

    pub fn department(id: impl Into<String>) -> Self {
        NodeId::Department(id.into())
    }

    /// The department grouping node for an optional department id.
    pub fn for_department(id: Option<&str>) -> Self {
        match id {
            Some(id) => NodeId::Department(id.to_string()),
            None => NodeId::Unassigned,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Employee(id) => write!(f, "{}{}", EMPLOYEE_PREFIX, id),
            NodeId::Department(id) => write!(f, "{}{}", DEPARTMENT_PREFIX, id),
            NodeId::Unassigned => f.write_str(UNASSIGNED),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid node id '{0}': expected 'employee:<id>', 'department:<id>' or 'unassigned'")]
pub struct ParseNodeIdError(pub String);

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNASSIGNED {
            return Ok(NodeId::Unassigned);
        }
        if let Some(id) = s.strip_prefix(EMPLOYEE_PREFIX).filter(|id| !id.is_empty()) {
            return Ok(NodeId::Employee(id.to_string()));
        }
        if let Some(id) = s.strip_prefix(DEPARTMENT_PREFIX).filter(|id| !id.is_empty()) {
            return Ok(NodeId::Department(id.to_string()));
        }
        Err(ParseNodeIdError(s.to_string()))
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for NodeId {
    type Error = ParseNodeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An employee placed in the managerial hierarchy.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmployeeNode {
    pub node_id: NodeId,
    #[serde(flatten)]
    pub employee: Employee,
    pub direct_reports: Vec<OrgChartNode>,
}

impl EmployeeNode {
    pub fn new(employee: Employee, direct_reports: Vec<OrgChartNode>) -> Self {
        Self {
            node_id: NodeId::Employee(employee.id.clone()),
            employee,
            direct_reports,
        }
    }
}

impl Drop for EmployeeNode {
    fn drop(&mut self) {
        drop_reports(&mut self.direct_reports);
    }
}

/// Synthetic grouping node over the local roots of one department.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DepartmentNode {
    pub node_id: NodeId,
    /// `None` for the unassigned group.
    pub department_id: Option<String>,
    pub department_name: String,
    /// Active employees in the department, not only its local roots.
    pub employee_count: usize,
    pub direct_reports: Vec<OrgChartNode>,
}

impl Drop for DepartmentNode {
    fn drop(&mut self) {
        drop_reports(&mut self.direct_reports);
    }
}

/// Releases a subtree level by level. Management chains can be thousands of
/// levels deep and the generated drop glue recurses once per level.
fn drop_reports(reports: &mut Vec<OrgChartNode>) {
    let mut pending = std::mem::take(reports);
    while let Some(mut node) = pending.pop() {
        pending.append(node.direct_reports_mut());
    }
}

/// One node of a built org chart.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum OrgChartNode {
    Employee(EmployeeNode),
    Department(DepartmentNode),
}

impl OrgChartNode {
    pub fn id(&self) -> &NodeId {
        match self {
            OrgChartNode::Employee(node) => &node.node_id,
            OrgChartNode::Department(node) => &node.node_id,
        }
    }

    pub fn direct_reports(&self) -> &[OrgChartNode] {
        match self {
            OrgChartNode::Employee(node) => &node.direct_reports,
            OrgChartNode::Department(node) => &node.direct_reports,
        }
    }

    fn direct_reports_mut(&mut self) -> &mut Vec<OrgChartNode> {
        match self {
            OrgChartNode::Employee(node) => &mut node.direct_reports,
            OrgChartNode::Department(node) => &mut node.direct_reports,
        }
    }

    pub fn as_employee(&self) -> Option<&Employee> {
        match self {
            OrgChartNode::Employee(node) => Some(&node.employee),
            OrgChartNode::Department(_) => None,
        }
    }
}

impl From<EmployeeNode> for OrgChartNode {
    fn from(node: EmployeeNode) -> Self {
        OrgChartNode::Employee(node)
    }
}

impl From<DepartmentNode> for OrgChartNode {
    fn from(node: DepartmentNode) -> Self {
        OrgChartNode::Department(node)
    }
}

/// Calls `visit(node, depth, parent)` for every node in pre-order.
pub fn walk<'a, F>(nodes: &'a [OrgChartNode], visit: &mut F)
where
    F: FnMut(&'a OrgChartNode, usize, Option<&'a NodeId>),
{
    let mut stack: Vec<(&'a OrgChartNode, usize, Option<&'a NodeId>)> =
        nodes.iter().rev().map(|node| (node, 0, None)).collect();

    while let Some((node, depth, parent)) = stack.pop() {
        visit(node, depth, parent);
        stack.extend(
            node.direct_reports()
                .iter()
                .rev()
                .map(|child| (child, depth + 1, Some(node.id()))),
        );
    }
}

/// Every node id of the tree in pre-order.
pub fn node_ids(nodes: &[OrgChartNode]) -> Vec<NodeId> {
    let mut ids = Vec::new();
    walk(nodes, &mut |node, _, _| ids.push(node.id().clone()));
    ids
}

/// Raw ids of every employee in the tree, in pre-order.
pub fn employee_ids(nodes: &[OrgChartNode]) -> Vec<String> {
    let mut ids = Vec::new();
    walk(nodes, &mut |node, _, _| {
        if let Some(employee) = node.as_employee() {
            ids.push(employee.id.clone());
        }
    });
    ids
}

pub fn find_node<'a>(nodes: &'a [OrgChartNode], id: &NodeId) -> Option<&'a OrgChartNode> {
    let mut stack: Vec<&'a OrgChartNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return Some(node);
        }
        stack.extend(node.direct_reports().iter().rev());
    }
    None
}

/// Serializes a forest to a JSON array.
///
/// Produces the same document as the derived `Serialize` impls, but keeps an
/// explicit stack of open `direct_reports` arrays instead of recursing per
/// level.
pub fn forest_to_json(nodes: &[OrgChartNode]) -> serde_json::Result<String> {
    let mut out = vec![b'['];
    let mut stack: Vec<(std::slice::Iter<'_, OrgChartNode>, bool)> = vec![(nodes.iter(), false)];

    while let Some((siblings, started)) = stack.last_mut() {
        match siblings.next() {
            Some(node) => {
                if *started {
                    out.push(b',');
                }
                *started = true;
                write_node_head(&mut out, node)?;
                stack.push((node.direct_reports().iter(), false));
            }
            None => {
                stack.pop();
                out.push(b']');
                if !stack.is_empty() {
                    out.push(b'}');
                }
            }
        }
    }

    // Only serde_json output went in, so the buffer is valid UTF-8.
    String::from_utf8(out).map_err(|e| serde::ser::Error::custom(e.to_string()))
}

/// Writes `{"node_type":..,<fields>,"direct_reports":[` for one node.
fn write_node_head(out: &mut Vec<u8>, node: &OrgChartNode) -> serde_json::Result<()> {
    let (node_type, fields) = match node {
        OrgChartNode::Employee(employee_node) => {
            let mut fields = match serde_json::to_value(&employee_node.employee)? {
                Value::Object(fields) => fields,
                _ => Map::new(),
            };
            fields.insert(
                "node_id".to_string(),
                serde_json::to_value(&employee_node.node_id)?,
            );
            ("employee", fields)
        }
        OrgChartNode::Department(department_node) => {
            let mut fields = Map::new();
            fields.insert(
                "node_id".to_string(),
                serde_json::to_value(&department_node.node_id)?,
            );
            fields.insert(
                "department_id".to_string(),
                serde_json::to_value(&department_node.department_id)?,
            );
            fields.insert(
                "department_name".to_string(),
                Value::from(department_node.department_name.as_str()),
            );
            fields.insert(
                "employee_count".to_string(),
                Value::from(department_node.employee_count),
            );
            ("department", fields)
        }
    };

    out.extend_from_slice(b"{\"node_type\":");
    serde_json::to_writer(&mut *out, node_type)?;
    for (key, value) in &fields {
        out.push(b',');
        serde_json::to_writer(&mut *out, key)?;
        out.push(b':');
        serde_json::to_writer(&mut *out, value)?;
    }
    out.extend_from_slice(b",\"direct_reports\":[");
    Ok(())
}
