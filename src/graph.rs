//! Recursion Analysis
//!
//! Builds a graph of the types that hold other types by value and breaks
//! every cycle with `Box<T>`. Uses `kosaraju_scc` to find recursive groups.

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::model::TypeSet;

/// By-value containment graph over a type set
pub struct ContainmentGraph {
    graph: DiGraph<String, ()>,
    /// Discovery position of each type, for stable ordering of groups
    order: HashMap<String, usize>,
}

impl ContainmentGraph {
    pub fn build(types: &TypeSet) -> Self {
        let mut graph = DiGraph::with_capacity(types.len(), types.len() * 2);
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::with_capacity(types.len());
        let mut order = HashMap::with_capacity(types.len());

        for (i, def) in types.iter().enumerate() {
            nodes.insert(def.name.as_str(), graph.add_node(def.name.clone()));
            order.insert(def.name.clone(), i);
        }

        for def in types.iter() {
            let from = nodes[def.name.as_str()];
            for expr in def.type_exprs() {
                for target in expr.direct_refs() {
                    if let Some(&to) = nodes.get(target) {
                        graph.update_edge(from, to, ());
                    }
                }
            }
        }

        Self { graph, order }
    }

    /// Groups of mutually recursive types, each in discovery order
    pub fn recursive_groups(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<String> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                names.sort_by_key(|n| self.order.get(n).copied().unwrap_or(usize::MAX));
                names
            })
            .collect();
        groups.sort_by_key(|g| g.first().and_then(|n| self.order.get(n)).copied().unwrap_or(usize::MAX));
        groups
    }
}

/// Box every by-value reference inside a recursive group.
///
/// Returns the number of references boxed.
pub fn box_recursive(types: &mut TypeSet) -> Result<usize> {
    if types.is_empty() {
        return Ok(0);
    }
    let groups = ContainmentGraph::build(types).recursive_groups();
    let mut boxed = 0;

    for group in groups {
        let all_aliases = group
            .iter()
            .all(|name| types.get(name).map(|d| d.is_alias()).unwrap_or(true));
        if all_aliases {
            return Err(CompileError::AliasCycle { members: group });
        }

        let members: HashSet<&str> = group.iter().map(String::as_str).collect();
        for name in &group {
            let Some(def) = types.get_mut(name) else {
                continue;
            };
            for expr in def.type_exprs_mut() {
                let targets: Vec<String> = expr
                    .direct_refs()
                    .into_iter()
                    .filter(|t| members.contains(t))
                    .map(String::from)
                    .collect();
                for target in targets {
                    if expr.box_ref(&target) {
                        boxed += 1;
                    }
                }
            }
        }
        debug!(members = ?group, "boxed recursive group");
    }

    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, TypeDef, TypeDefKind, TypeExpr};

    fn field(name: &str, ty: TypeExpr) -> Field {
        Field {
            json_name: name.to_string(),
            rust_name: name.to_string(),
            ty,
            required: false,
            description: None,
        }
    }

    fn strukt(name: &str, fields: Vec<Field>) -> TypeDef {
        TypeDef {
            name: name.to_string(),
            description: None,
            origin: format!("test.schema.json#/definitions/{}", name),
            kind: TypeDefKind::Struct {
                fields,
                flatten: Vec::new(),
                additional: None,
            },
        }
    }

    fn alias(name: &str, target: TypeExpr) -> TypeDef {
        TypeDef {
            name: name.to_string(),
            description: None,
            origin: format!("test.schema.json#/definitions/{}", name),
            kind: TypeDefKind::Alias { target },
        }
    }

    fn named(name: &str) -> TypeExpr {
        TypeExpr::Named(name.to_string())
    }

    #[test]
    fn test_self_reference_is_boxed() {
        let mut types = TypeSet::new();
        types
            .insert(strukt("Node", vec![field("next", TypeExpr::optional(named("Node")))]))
            .unwrap();

        assert_eq!(box_recursive(&mut types).unwrap(), 1);
        let def = types.get("Node").unwrap();
        assert_eq!(
            def.type_exprs()[0],
            &TypeExpr::Optional(Box::new(TypeExpr::Boxed(Box::new(named("Node")))))
        );
    }

    #[test]
    fn test_collections_break_cycles() {
        let mut types = TypeSet::new();
        types
            .insert(strukt("Tree", vec![field("children", TypeExpr::array(named("Tree")))]))
            .unwrap();

        assert_eq!(box_recursive(&mut types).unwrap(), 0);
    }

    #[test]
    fn test_mutual_recursion() {
        let mut types = TypeSet::new();
        types.insert(strukt("A", vec![field("b", TypeExpr::optional(named("B")))])).unwrap();
        types.insert(strukt("B", vec![field("a", TypeExpr::optional(named("A")))])).unwrap();
        types.insert(strukt("C", vec![field("a", named("A"))])).unwrap();

        let groups = ContainmentGraph::build(&types).recursive_groups();
        assert_eq!(groups, vec![vec!["A".to_string(), "B".to_string()]]);

        assert_eq!(box_recursive(&mut types).unwrap(), 2);
        // C is outside the cycle and keeps its plain reference
        assert_eq!(types.get("C").unwrap().type_exprs()[0], &named("A"));
    }

    #[test]
    fn test_alias_cycle_rejected() {
        let mut types = TypeSet::new();
        types.insert(alias("A", named("B"))).unwrap();
        types.insert(alias("B", named("A"))).unwrap();

        let err = box_recursive(&mut types).unwrap_err();
        match err {
            CompileError::AliasCycle { members } => assert_eq!(members, vec!["A", "B"]),
            other => panic!("Expected AliasCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_type_set() {
        assert_eq!(box_recursive(&mut TypeSet::new()).unwrap(), 0);
    }
}
