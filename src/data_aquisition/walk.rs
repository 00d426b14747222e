/*!
Cursor bookkeeping for a GETBULK walk over several sub-trees at once.

A GETBULK response interleaves its repetitions: with `n` requested names, binding `i`
belongs to name `i % n`. Each sub-tree keeps its own cursor and leaves the walk as soon
as the agent answers past its root, reports end-of-MIB, or stops making progress.
*/

use super::core::Binding;

#[derive(Debug, Clone)]
struct SubtreeCursor {
    root: Vec<u64>,
    next: Vec<u64>,
    done: bool,
}

/// State of one walk across a fixed set of roots.
#[derive(Debug, Clone)]
pub struct BulkWalk {
    cursors: Vec<SubtreeCursor>,
    collected: Vec<Binding>,
    rounds: usize,
}

impl BulkWalk {
    pub fn new(roots: &[&[u64]]) -> Self {
        let cursors = roots
            .iter()
            .map(|root| SubtreeCursor {
                root: root.to_vec(),
                next: root.to_vec(),
                done: false,
            })
            .collect();
        Self {
            cursors,
            collected: Vec::new(),
            rounds: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursors.iter().all(|c| c.done)
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Sub-trees still being walked, as `(cursor slot, start oid)` pairs in request order.
    pub fn pending(&self) -> Vec<(usize, Vec<u64>)> {
        self.cursors
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.done)
            .map(|(slot, c)| (slot, c.next.clone()))
            .collect()
    }

    /// Feeds one GETBULK response for the request built from `requested` slots.
    pub fn absorb(&mut self, requested: &[usize], response: Vec<Binding>) {
        self.rounds += 1;
        if requested.is_empty() {
            return;
        }

        let mut advanced = vec![false; requested.len()];
        for (i, binding) in response.into_iter().enumerate() {
            let column = i % requested.len();
            let cursor = &mut self.cursors[requested[column]];
            if cursor.done {
                continue;
            }

            let inside = matches!(binding.index_under(&cursor.root), Some(rest) if !rest.is_empty());
            if !inside || binding.value.is_exception() {
                cursor.done = true;
                continue;
            }
            // Agents must answer strictly past the cursor; anything else would loop forever.
            if binding.oid <= cursor.next {
                cursor.done = true;
                continue;
            }

            cursor.next = binding.oid.clone();
            advanced[column] = true;
            self.collected.push(binding);
        }

        for (column, slot) in requested.iter().enumerate() {
            if !advanced[column] {
                self.cursors[*slot].done = true;
            }
        }
    }

    /// Stops every sub-tree that is still open.
    pub fn abandon(&mut self) {
        for cursor in &mut self.cursors {
            cursor.done = true;
        }
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.collected
    }
}
