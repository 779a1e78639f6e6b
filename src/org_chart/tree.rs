//! Org chart tree construction.
//!
//! Turns a flat employee listing into a forest ordered by name (tie-break id).
//! Corrupt manager data never fails a build: dangling references make the
//! employee a root, manager cycles are cut so that every member of the cycle
//! surfaces as a root, and duplicate ids keep the last record.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

use crate::employee::model::Employee;
use crate::org_chart::model::{
    DepartmentNode, EmployeeNode, NodeId, OrgChartNode, UNASSIGNED_DEPARTMENT_NAME,
};

/// Data problems found while building a tree. None of them abort the build.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct TreeAnomalies {
    /// Ids that occurred more than once in the listing.
    pub duplicate_ids: Vec<String>,
    /// Employees whose manager is missing or not active.
    pub orphan_ids: Vec<String>,
    /// Employees detached from a cyclic manager chain.
    pub cycle_broken_ids: Vec<String>,
    /// Records left out because their status is not active.
    pub skipped_inactive: usize,
}

impl TreeAnomalies {
    pub fn is_empty(&self) -> bool {
        self.duplicate_ids.is_empty()
            && self.orphan_ids.is_empty()
            && self.cycle_broken_ids.is_empty()
    }

    fn finish(mut self) -> Self {
        for ids in [
            &mut self.duplicate_ids,
            &mut self.orphan_ids,
            &mut self.cycle_broken_ids,
        ] {
            ids.sort();
            ids.dedup();
        }
        self
    }

    fn log(&self) {
        if !self.duplicate_ids.is_empty() {
            log::warn!(
                "Org chart input has duplicate employee ids, keeping the last record: {:?}",
                self.duplicate_ids
            );
        }
        if !self.orphan_ids.is_empty() {
            log::warn!(
                "Org chart employees with unresolved managers placed as roots: {:?}",
                self.orphan_ids
            );
        }
        if !self.cycle_broken_ids.is_empty() {
            log::warn!(
                "Org chart manager cycle broken, employees placed as roots: {:?}",
                self.cycle_broken_ids
            );
        }
    }
}

/// Built nodes together with the anomalies found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeBuild<T> {
    pub nodes: Vec<T>,
    pub anomalies: TreeAnomalies,
}

/// Builds the managerial forest without department grouping.
pub fn build_employee_tree(employees: &[Employee]) -> Vec<EmployeeNode> {
    let build = build_employee_tree_report(employees);
    build.anomalies.log();
    build.nodes
}

pub fn build_employee_tree_report(employees: &[Employee]) -> TreeBuild<EmployeeNode> {
    let mut anomalies = TreeAnomalies::default();
    let roster = Roster::index(employees, &mut anomalies);
    let hierarchy = Hierarchy::resolve(&roster, |_, _| true, &mut anomalies);
    let nodes = hierarchy.assemble_roots(hierarchy.roots().to_vec());

    TreeBuild {
        nodes,
        anomalies: anomalies.finish(),
    }
}

/// Builds the department-grouped forest, naming departments from the
/// resolved references embedded in the listing.
pub fn build_grouped_employee_tree(employees: &[Employee]) -> Vec<OrgChartNode> {
    let build = build_grouped_employee_tree_report(employees, &HashMap::new());
    build.anomalies.log();
    build.nodes
}

/// Like [`build_grouped_employee_tree`], with department names taken from
/// `department_names` first and from the embedded references second.
pub fn build_grouped_employee_tree_with_names(
    employees: &[Employee],
    department_names: &HashMap<String, String>,
) -> Vec<OrgChartNode> {
    let build = build_grouped_employee_tree_report(employees, department_names);
    build.anomalies.log();
    build.nodes
}

pub fn build_grouped_employee_tree_report(
    employees: &[Employee],
    department_names: &HashMap<String, String>,
) -> TreeBuild<OrgChartNode> {
    let mut anomalies = TreeAnomalies::default();
    let roster = Roster::index(employees, &mut anomalies);

    if roster.members.iter().all(|e| e.department_key().is_none()) {
        // No departments at all: same result as the flat builder.
        let hierarchy = Hierarchy::resolve(&roster, |_, _| true, &mut anomalies);
        let nodes = hierarchy
            .assemble_roots(hierarchy.roots().to_vec())
            .into_iter()
            .map(OrgChartNode::from)
            .collect();
        return TreeBuild {
            nodes,
            anomalies: anomalies.finish(),
        };
    }

    let hierarchy = Hierarchy::resolve(
        &roster,
        |employee, manager| employee.department_key() == manager.department_key(),
        &mut anomalies,
    );

    let mut groups: HashMap<Option<&str>, Vec<&Employee>> = HashMap::new();
    for employee in roster.members.iter().copied() {
        groups.entry(employee.department_key()).or_default().push(employee);
    }

    let mut departments: Vec<DepartmentNode> = groups
        .into_iter()
        .map(|(key, members)| {
            let local_roots: Vec<&Employee> = hierarchy
                .roots()
                .iter()
                .copied()
                .filter(|e| e.department_key() == key)
                .collect();
            DepartmentNode {
                node_id: NodeId::for_department(key),
                department_id: key.map(str::to_string),
                department_name: resolve_department_name(key, &members, department_names),
                employee_count: members.len(),
                direct_reports: hierarchy
                    .assemble_roots(local_roots)
                    .into_iter()
                    .map(OrgChartNode::from)
                    .collect(),
            }
        })
        .collect();

    // Named departments by name then id; the unassigned group goes last.
    departments.sort_by(|a, b| {
        (a.department_id.is_none(), &a.department_name, &a.department_id).cmp(&(
            b.department_id.is_none(),
            &b.department_name,
            &b.department_id,
        ))
    });

    TreeBuild {
        nodes: departments.into_iter().map(OrgChartNode::from).collect(),
        anomalies: anomalies.finish(),
    }
}

fn resolve_department_name(
    key: Option<&str>,
    members: &[&Employee],
    department_names: &HashMap<String, String>,
) -> String {
    let Some(id) = key else {
        return UNASSIGNED_DEPARTMENT_NAME.to_string();
    };
    if let Some(name) = department_names.get(id) {
        return name.clone();
    }
    // Members are sorted by (name, id), so the pick does not depend on input order.
    members
        .iter()
        .filter_map(|e| e.department.as_ref())
        .find(|dept| dept.id == id)
        .map(|dept| dept.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn by_name_then_id(a: &&Employee, b: &&Employee) -> std::cmp::Ordering {
    (&a.name, &a.id).cmp(&(&b.name, &b.id))
}

/// Active employees indexed by id.
struct Roster<'a> {
    by_id: HashMap<&'a str, &'a Employee>,
    /// Sorted by name then id.
    members: Vec<&'a Employee>,
}

impl<'a> Roster<'a> {
    fn index(employees: &'a [Employee], anomalies: &mut TreeAnomalies) -> Self {
        let mut latest: HashMap<&'a str, &'a Employee> = HashMap::with_capacity(employees.len());
        for employee in employees {
            if latest.insert(employee.id.as_str(), employee).is_some() {
                anomalies.duplicate_ids.push(employee.id.clone());
            }
        }

        let mut by_id = HashMap::with_capacity(latest.len());
        for (id, employee) in latest {
            if employee.status.is_active() {
                by_id.insert(id, employee);
            } else {
                anomalies.skipped_inactive += 1;
            }
        }
        let mut members: Vec<&'a Employee> = by_id.values().copied().collect();
        members.sort_by(by_name_then_id);

        Self { by_id, members }
    }
}

/// Resolved parent links with cycles removed.
struct Hierarchy<'a> {
    children: HashMap<&'a str, Vec<&'a Employee>>,
    /// Sorted by name then id.
    roots: Vec<&'a Employee>,
}

impl<'a> Hierarchy<'a> {
    /// `same_group(employee, manager)` decides whether a resolvable manager may
    /// be the parent. Returning false makes the employee a (local) root.
    fn resolve<F>(roster: &Roster<'a>, same_group: F, anomalies: &mut TreeAnomalies) -> Self
    where
        F: Fn(&Employee, &Employee) -> bool,
    {
        let mut parents: HashMap<&'a str, Option<&'a str>> =
            HashMap::with_capacity(roster.members.len());
        for employee in roster.members.iter().copied() {
            let parent = match employee.manager_id.as_deref() {
                None => None,
                Some(manager_id) => match roster.by_id.get(manager_id) {
                    Some(&manager) if same_group(employee, manager) => Some(manager.id.as_str()),
                    Some(_) => None,
                    None => {
                        anomalies.orphan_ids.push(employee.id.clone());
                        None
                    }
                },
            };
            parents.insert(employee.id.as_str(), parent);
        }

        for id in cyclic_members(&roster.members, &parents) {
            parents.insert(id, None);
            anomalies.cycle_broken_ids.push(id.to_string());
        }

        let mut children: HashMap<&'a str, Vec<&'a Employee>> = HashMap::new();
        let mut roots = Vec::new();
        for employee in roster.members.iter().copied() {
            match parents.get(employee.id.as_str()).copied().flatten() {
                Some(parent) => children.entry(parent).or_default().push(employee),
                None => roots.push(employee),
            }
        }

        Self { children, roots }
    }

    fn roots(&self) -> &[&'a Employee] {
        &self.roots
    }

    /// Builds the subtrees under `roots` bottom-up with an explicit stack, so
    /// the depth of a management chain never translates into call depth. A
    /// child that is already on the current path is skipped.
    fn assemble_roots(&self, roots: Vec<&'a Employee>) -> Vec<EmployeeNode> {
        let mut assembled = Vec::with_capacity(roots.len());
        let mut ancestors: HashSet<&'a str> = HashSet::new();

        for root in roots {
            ancestors.insert(root.id.as_str());
            let mut stack = vec![Frame::new(root)];

            while let Some(frame) = stack.last_mut() {
                let next_child = self
                    .children
                    .get(frame.employee.id.as_str())
                    .and_then(|reports| reports.get(frame.next))
                    .copied();

                if let Some(child) = next_child {
                    frame.next += 1;
                    if !ancestors.insert(child.id.as_str()) {
                        log::warn!(
                            "Skipping employee {} under {}: already an ancestor",
                            child.id,
                            frame.employee.id
                        );
                        continue;
                    }
                    stack.push(Frame::new(child));
                    continue;
                }

                let Some(done) = stack.pop() else { break };
                ancestors.remove(done.employee.id.as_str());
                let node = EmployeeNode::new(done.employee.clone(), done.reports);
                match stack.last_mut() {
                    Some(parent) => parent.reports.push(OrgChartNode::Employee(node)),
                    None => assembled.push(node),
                }
            }
        }

        assembled
    }
}

/// An employee whose direct reports are being assembled.
struct Frame<'a> {
    employee: &'a Employee,
    /// Index of the next child to visit.
    next: usize,
    reports: Vec<OrgChartNode>,
}

impl<'a> Frame<'a> {
    fn new(employee: &'a Employee) -> Self {
        Self {
            employee,
            next: 0,
            reports: Vec::new(),
        }
    }
}

/// Ids lying on a cycle of the parent links. Employees that merely report
/// into a cycle are not included.
fn cyclic_members<'a>(
    members: &[&'a Employee],
    parents: &HashMap<&'a str, Option<&'a str>>,
) -> Vec<&'a str> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        OnPath,
        Done,
    }

    let mut marks: HashMap<&'a str, Mark> = HashMap::with_capacity(members.len());
    let mut cyclic = Vec::new();

    for start in members.iter().copied() {
        let mut path: Vec<&'a str> = Vec::new();
        let mut current = Some(start.id.as_str());

        while let Some(id) = current {
            match marks.get(id) {
                Some(Mark::Done) => break,
                Some(Mark::OnPath) => {
                    if let Some(pos) = path.iter().position(|p| *p == id) {
                        cyclic.extend_from_slice(&path[pos..]);
                    }
                    break;
                }
                None => {
                    marks.insert(id, Mark::OnPath);
                    path.push(id);
                    current = parents.get(id).copied().flatten();
                }
            }
        }

        for id in path {
            marks.insert(id, Mark::Done);
        }
    }

    cyclic
}
