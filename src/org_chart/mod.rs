//! Organization chart engine: tree construction, department colors and the
//! expand/collapse state of a chart view.

pub mod color;
pub mod model;
pub mod routes;
pub mod tree;
pub mod view_state;


pub use color::{department_color, department_colors, CategoryToken};
pub use model::{DepartmentNode, EmployeeNode, NodeId, OrgChartNode};
pub use tree::{build_employee_tree, build_grouped_employee_tree, TreeAnomalies};
pub use view_state::{initialize, toggle, ChartLayout, ChartView, DepartmentFilter, ViewState};
