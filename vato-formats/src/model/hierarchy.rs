//! Node tree reconstruction from the flat depth-first node list
//!
//! Nodes are stored in preorder, each with its own child count. Node `i`'s
//! children are the subtrees that immediately follow it, so the tree is
//! rebuilt by consuming indices in order with an explicit stack.

use crate::error::{FormatError, Result};

/// Build per-node child lists from preorder child counts
///
/// Node 0 is the root. Every node must be consumed exactly once; counts that
/// ask for more nodes than exist, or leave nodes unreached, are rejected.
pub fn build_children(child_counts: &[u32]) -> Result<Vec<Vec<usize>>> {
    let declared = child_counts.len();
    let mut children = vec![Vec::new(); declared];
    if declared == 0 {
        return Ok(children);
    }

    // (node, children still to consume)
    let mut stack = vec![(0usize, child_counts[0])];
    let mut next = 1usize;

    while let Some(top) = stack.last_mut() {
        if top.1 == 0 {
            stack.pop();
            continue;
        }
        top.1 -= 1;
        let parent = top.0;

        if next >= declared {
            return Err(FormatError::MalformedHierarchy {
                consumed: next + 1,
                declared,
            });
        }
        children[parent].push(next);
        stack.push((next, child_counts[next]));
        next += 1;
    }

    if next != declared {
        return Err(FormatError::MalformedHierarchy {
            consumed: next,
            declared,
        });
    }
    Ok(children)
}
