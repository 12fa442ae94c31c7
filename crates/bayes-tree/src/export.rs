//! GraphViz export of the clique structure. Diagnostic only; the output is
//! not read back.

use std::io;

use bayes_core::Conditional;
use petgraph::dot::{Config, Dot};

use crate::clique::clique_label;
use crate::tree::BayesTree;

impl<C: Conditional> BayesTree<C> {
    /// The tree in dot format: one node per clique labelled
    /// `"frontals : separator"`, one edge per parent/child link.
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &|_, (_, clique)| {
                format!(
                    "label = \"{}\" ",
                    clique_label(clique.frontals(), clique.separator())
                )
            },
        );
        format!("{dot:?}")
    }

    /// Write [`to_dot`](Self::to_dot) to `writer`.
    pub fn save_graph<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_dot().as_bytes())
    }
}
