//! Dominator tree and dominance frontiers.
//!
//! Uses the iterative algorithm of Cooper, Harvey, and Kennedy
//! ("A Simple, Fast Dominance Algorithm", 2001): initialize the entry
//! to dominate itself, then sweep the blocks in reverse post-order,
//! intersecting the processed predecessors' immediate dominators
//! until a fixpoint. Frontiers are computed afterwards by walking
//! each join point's predecessors up the dominator chain.

use crate::core::pool::{Pool, ValueRef};
use crate::core::BlockTraversalOrder;
use indenter::indented;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};

pub struct DomTreeNode {
    block: ValueRef,
    parent: Option<ValueRef>,
    children: Vec<ValueRef>,
    frontiers: Vec<ValueRef>,
}

impl DomTreeNode {
    pub fn block(&self) -> ValueRef {
        self.block
    }

    pub fn parent(&self) -> Option<ValueRef> {
        self.parent
    }

    pub fn children(&self) -> &[ValueRef] {
        &self.children
    }

    pub fn frontiers(&self) -> &[ValueRef] {
        &self.frontiers
    }
}

pub struct DomTree {
    root: ValueRef,
    /// Reachable blocks in reverse post-order, root first.
    order: Vec<ValueRef>,
    nodes: HashMap<ValueRef, DomTreeNode>,
}

impl DomTree {
    pub fn root(&self) -> ValueRef {
        self.root
    }

    pub fn contains(&self, block: ValueRef) -> bool {
        self.nodes.contains_key(&block)
    }

    pub fn node(&self, block: ValueRef) -> &DomTreeNode {
        self.nodes.get(&block).expect("block not found in the dom tree")
    }

    /// Reachable blocks in reverse post-order.
    pub fn blocks(&self) -> &[ValueRef] {
        &self.order
    }

    pub fn immediate_dominator(&self, block: ValueRef) -> Option<ValueRef> {
        self.node(block).parent
    }

    /// Whether `src` dominates `dst`; reflexive.
    pub fn dominates(&self, src: ValueRef, dst: ValueRef) -> bool {
        let mut cursor = Some(dst);
        while let Some(b) = cursor {
            if b == src {
                return true;
            }
            cursor = self.node(b).parent;
        }
        false
    }

    pub fn strictly_dominates(&self, src: ValueRef, dst: ValueRef) -> bool {
        src != dst && self.dominates(src, dst)
    }

    pub fn display<'a>(&'a self, pool: &'a Pool) -> DomTreeDisplay<'a> {
        DomTreeDisplay { tree: self, pool }
    }
}

pub fn compute_dom_tree(pool: &Pool, function: ValueRef) -> DomTree {
    let root = pool.function_body(function).expect("function has no definition");
    let postorder = pool.blocks_in_order(root, BlockTraversalOrder::PostOrder);
    let postorder_index: HashMap<ValueRef, usize> =
        postorder.iter().enumerate().map(|(i, &b)| (b, i)).collect();
    debug_assert_eq!(postorder.last(), Some(&root), "entry must be last in post-order");

    let mut rpo: Vec<ValueRef> = postorder.iter().rev().copied().collect();
    rpo.remove(0); // the root's dominator is fixed

    let mut doms: HashMap<ValueRef, Option<ValueRef>> = HashMap::new();
    for &b in &rpo {
        doms.insert(b, None);
    }
    doms.insert(root, Some(root));

    let intersect = |doms: &HashMap<ValueRef, Option<ValueRef>>, b1: ValueRef, b2: ValueRef| {
        let mut finger1 = b1;
        let mut finger2 = b2;
        while finger1 != finger2 {
            while postorder_index[&finger1] < postorder_index[&finger2] {
                finger1 = doms[&finger1].expect("unprocessed dominator");
            }
            while postorder_index[&finger2] < postorder_index[&finger1] {
                finger2 = doms[&finger2].expect("unprocessed dominator");
            }
        }
        finger1
    };

    loop {
        let mut changed = false;
        for &block in &rpo {
            let mut new_idom: Option<ValueRef> = None;
            for pred in pool.predecessors(block) {
                if let Some(Some(_)) = doms.get(&pred) {
                    new_idom = Some(match new_idom {
                        None => pred,
                        Some(other) => intersect(&doms, pred, other),
                    });
                }
            }
            if doms[&block] != new_idom {
                doms.insert(block, new_idom);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut nodes: HashMap<ValueRef, DomTreeNode> = HashMap::new();
    let mut order = vec![root];
    order.extend(rpo.iter().copied());
    for &b in &order {
        nodes.insert(
            b,
            DomTreeNode {
                block: b,
                parent: None,
                children: Vec::new(),
                frontiers: Vec::new(),
            },
        );
    }
    for &block in &rpo {
        let idom = doms[&block].expect("reachable block has no dominator");
        nodes.get_mut(&block).unwrap().parent = Some(idom);
        nodes.get_mut(&idom).unwrap().children.push(block);
    }

    let mut tree = DomTree { root, order, nodes };
    compute_dominance_frontiers(pool, &mut tree);
    tree
}

fn compute_dominance_frontiers(pool: &Pool, tree: &mut DomTree) {
    let mut frontier_sets: HashMap<ValueRef, HashSet<ValueRef>> = HashMap::new();
    let order = tree.order.clone();
    for &block in &order {
        let preds: Vec<ValueRef> = pool
            .predecessors(block)
            .into_iter()
            .filter(|p| tree.contains(*p))
            .collect();
        if preds.len() < 2 {
            continue;
        }
        let idom = match tree.nodes[&block].parent {
            Some(p) => p,
            None => continue,
        };
        for pred in preds {
            let mut runner = pred;
            while runner != idom {
                if frontier_sets.entry(runner).or_default().insert(block) {
                    tree.nodes.get_mut(&runner).unwrap().frontiers.push(block);
                }
                runner = tree.nodes[&runner].parent.expect("frontier walk escaped the tree");
            }
        }
    }
}

pub struct DomTreeDisplay<'a> {
    tree: &'a DomTree,
    pool: &'a Pool,
}

impl DomTreeDisplay<'_> {
    fn block_name(&self, block: ValueRef) -> String {
        match self.pool.name_of(block) {
            Some(name) => name.to_string(),
            None => format!("%v{}", block.index()),
        }
    }

    fn fmt_node(&self, f: &mut dyn Write, block: ValueRef) -> fmt::Result {
        let node = self.tree.node(block);
        write!(f, "{}", self.block_name(block))?;
        if !node.frontiers.is_empty() {
            write!(f, " (frontiers:")?;
            for &fr in &node.frontiers {
                write!(f, " {}", self.block_name(fr))?;
            }
            write!(f, ")")?;
        }
        writeln!(f)?;
        for &child in &node.children {
            let mut writer: &mut dyn Write = &mut *f;
            let mut ind = indented(&mut writer).with_str("  ");
            self.fmt_node(&mut ind, child)?;
        }
        Ok(())
    }
}

impl fmt::Display for DomTreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.tree.root)
    }
}
