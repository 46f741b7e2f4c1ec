//! Usage statement synthesis.
//!
//! Every option is linked to the options its `requires` expression
//! inclusively depends on and to the options that are always required in
//! the statement. Mutually dependent options collapse into one strongly
//! connected component, which renders as an atomic unit. The condensation
//! is ordered topologically (dependencies first, ties broken by schema
//! order).
//!
//! Requirement dependencies then group components into chains: an option
//! that nothing else requires anchors a chain listing its dependencies
//! first, each bracketed unless required, and the anchor last, so
//! `-s requires -f` renders as `[-f] -s`. Options outside any chain are
//! bracketed unless required.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use option_schema_core::{
    OptionDef, RequiredValue, Requirement, RequirementCallback, RequirementVisitor, Schema,
};
use option_schema_text::TerminalString;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::config::{FormatFlags, HelpStyles};
use crate::params::param_template;
use crate::section::{UsageSection, passes};

/// Keys an expression needs present for it to hold.
///
/// All-of takes the union of its items, one-of the intersection. Negations
/// and callbacks contribute nothing.
struct InclusiveDeps;

impl RequirementVisitor for InclusiveDeps {
    type Output = BTreeSet<String>;

    fn visit_key(&mut self, key: &str) -> Self::Output {
        BTreeSet::from([key.to_string()])
    }

    fn visit_not(&mut self, _inner: &Requirement) -> Self::Output {
        BTreeSet::new()
    }

    fn visit_all_of(&mut self, items: &[Requirement]) -> Self::Output {
        items.iter().flat_map(|item| item.visit(self)).collect()
    }

    fn visit_one_of(&mut self, items: &[Requirement]) -> Self::Output {
        let mut sets = items.iter().map(|item| item.visit(self));
        let Some(first) = sets.next() else {
            return BTreeSet::new();
        };
        sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect())
    }

    fn visit_values(&mut self, entries: &[(String, RequiredValue)]) -> Self::Output {
        entries
            .iter()
            .filter(|(_, expected)| !matches!(expected, RequiredValue::Absent))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn visit_callback(&mut self, _callback: &RequirementCallback) -> Self::Output {
        BTreeSet::new()
    }
}

/// Dependency structure of one usage statement. Component ids index every
/// per-component vector; option indices refer to `options`.
struct UsageGraph<'a> {
    options: Vec<&'a OptionDef>,
    required: Vec<bool>,
    /// Members of each component, in schema order with a positional member
    /// last.
    components: Vec<Vec<usize>>,
    /// Components each component's requirements depend on.
    requires: Vec<BTreeSet<usize>>,
    /// Top-level sequence: each chain lists dependencies before its anchor.
    chains: Vec<Vec<usize>>,
    bracketed: Vec<bool>,
}

impl<'a> UsageGraph<'a> {
    fn build(schema: &'a Schema, section: &UsageSection) -> Self {
        let entries: Vec<(&str, &OptionDef)> = schema
            .iter()
            .filter(|(key, option)| {
                !option.hidden
                    && (option.has_suppliable_name() || option.positional().is_some())
                    && passes(&section.filter, section.exclude, key)
            })
            .collect();
        let index: HashMap<&str, usize> = entries
            .iter()
            .enumerate()
            .map(|(position, (key, _))| (*key, position))
            .collect();
        let required: Vec<bool> = entries
            .iter()
            .map(|(key, option)| option.required || section.required.iter().any(|item| item == key))
            .collect();

        let mut graph: DiGraph<usize, Edge> = DiGraph::with_capacity(entries.len(), 0);
        let nodes: Vec<NodeIndex> = (0..entries.len()).map(|i| graph.add_node(i)).collect();
        for (position, (_, option)) in entries.iter().enumerate() {
            if let Some(requires) = &option.requires {
                for dep in requires.visit(&mut InclusiveDeps) {
                    if let Some(&target) = index.get(dep.as_str()) {
                        if target != position {
                            graph.add_edge(nodes[position], nodes[target], Edge::Requires);
                        }
                    }
                }
            }
            for target in (0..entries.len()).filter(|&target| required[target]) {
                if target != position {
                    graph.add_edge(nodes[position], nodes[target], Edge::Required);
                }
            }
        }

        let mut components: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .map(|scc| {
                let mut members: Vec<usize> = scc.into_iter().map(|node| graph[node]).collect();
                members.sort_unstable_by_key(|&m| (entries[m].1.positional().is_some(), m));
                members
            })
            .collect();
        components.sort_unstable_by_key(|members| members.iter().copied().min());

        let mut component_of = vec![0; entries.len()];
        for (id, members) in components.iter().enumerate() {
            for &member in members {
                component_of[member] = id;
            }
        }
        let mut deps = vec![BTreeSet::new(); components.len()];
        let mut requires = vec![BTreeSet::new(); components.len()];
        for edge in graph.edge_references() {
            let from = component_of[graph[edge.source()]];
            let to = component_of[graph[edge.target()]];
            if from == to {
                continue;
            }
            deps[from].insert(to);
            if *edge.weight() == Edge::Requires {
                requires[from].insert(to);
            }
        }

        let order = topological_order(&deps);

        // Requirements of a required component are required too.
        let mut effective: Vec<bool> = components
            .iter()
            .map(|members| members.iter().any(|&member| required[member]))
            .collect();
        for &id in order.iter().rev() {
            if effective[id] {
                for &dep in &requires[id] {
                    effective[dep] = true;
                }
            }
        }

        let mut depended = vec![false; components.len()];
        for set in &requires {
            for &dep in set {
                depended[dep] = true;
            }
        }
        let mut rank = vec![0; components.len()];
        for (position, &id) in order.iter().enumerate() {
            rank[id] = position;
        }
        let mut placed = vec![false; components.len()];
        let mut chains = Vec::new();
        for &anchor in order.iter().filter(|&&id| !depended[id]) {
            let mut closure = BTreeSet::new();
            let mut pending = vec![anchor];
            while let Some(id) = pending.pop() {
                for &dep in &requires[id] {
                    if closure.insert(dep) {
                        pending.push(dep);
                    }
                }
            }
            let mut chain: Vec<usize> = closure.into_iter().filter(|&id| !placed[id]).collect();
            chain.sort_unstable_by_key(|&id| rank[id]);
            chain.push(anchor);
            for &id in &chain {
                placed[id] = true;
            }
            chains.push(chain);
        }

        let bracketed = (0..components.len())
            .map(|id| !effective[id] && (depended[id] || requires[id].is_empty()))
            .collect();

        let mut usage = Self {
            options: entries.iter().map(|(_, option)| *option).collect(),
            required,
            components,
            requires,
            chains,
            bracketed,
        };
        usage.move_positional_last();
        usage
    }

    /// Moves the chain holding the positional option to the right of every
    /// following chain whose requirements do not reach into it.
    fn move_positional_last(&mut self) {
        let Some(positional) = self
            .components
            .iter()
            .position(|members| members.iter().any(|&m| self.options[m].positional().is_some()))
        else {
            return;
        };
        let Some(mut position) = self.chains.iter().position(|chain| chain.contains(&positional))
        else {
            return;
        };
        while position + 1 < self.chains.len() {
            let moved = &self.chains[position];
            let next = &self.chains[position + 1];
            if next
                .iter()
                .any(|&id| self.requires[id].iter().any(|dep| moved.contains(dep)))
            {
                break;
            }
            self.chains.swap(position, position + 1);
            position += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    /// From an option to one its requirements depend on.
    Requires,
    /// From an option to one that is always required in the statement.
    Required,
}

/// Kahn's algorithm over component dependencies; among ready components
/// the one appearing first in the schema wins.
fn topological_order(deps: &[BTreeSet<usize>]) -> Vec<usize> {
    let mut pending: Vec<usize> = deps.iter().map(BTreeSet::len).collect();
    let mut dependents = vec![Vec::new(); deps.len()];
    for (id, set) in deps.iter().enumerate() {
        for &dep in set {
            dependents[dep].push(id);
        }
    }
    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| Reverse(id))
        .collect();
    let mut order = Vec::with_capacity(deps.len());
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        for &dependent in &dependents[id] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }
    order
}

struct UsageRenderer<'a> {
    graph: &'a UsageGraph<'a>,
    styles: &'a HelpStyles,
    out: TerminalString,
}

impl UsageRenderer<'_> {
    fn component(&mut self, id: usize) {
        let graph = self.graph;
        let bracket = graph.bracketed[id];
        let sole = bracket && graph.components[id].len() == 1;
        if bracket {
            self.out.open("[");
        }
        for &member in &graph.components[id] {
            self.option(member, sole);
        }
        if bracket {
            self.out.close("]");
        }
    }

    /// Renders one option. `sole` means it is the only content of its own
    /// brackets, which then delimit any alternation.
    fn option(&mut self, member: usize, sole: bool) {
        let option = self.graph.options[member];
        let names: Vec<&str> = option.display_names().collect();
        let template = param_template(option, self.styles);
        let stdin = option.stdin;

        if stdin && !sole {
            self.out.open("(");
        }
        if !names.is_empty() {
            if option.positional().is_some() {
                self.out.open("[");
                self.alternation(option, &names);
                self.out.close("]");
            } else {
                let parenthesize =
                    names.len() > 1 && !(sole && template.is_empty() && !stdin);
                if parenthesize {
                    self.out.open("(");
                }
                self.alternation(option, &names);
                if parenthesize {
                    self.out.close(")");
                }
            }
        }
        self.out.append(&template);
        if stdin {
            self.out.close("|-");
            if !sole {
                self.out.close(")");
            }
        }
    }

    fn alternation(&mut self, option: &OptionDef, names: &[&str]) {
        let styles = self.styles;
        let style = option.styles.names.as_ref().unwrap_or(&styles.symbol);
        for (position, name) in names.iter().enumerate() {
            if position > 0 {
                self.out.close("|");
                self.out.set_merge(true);
            }
            self.out.styled(style, name);
        }
    }
}

/// Renders the usage statement of `schema` into one buffer.
pub(crate) fn format_usage(
    schema: &Schema,
    section: &UsageSection,
    flags: &FormatFlags,
    styles: &HelpStyles,
) -> TerminalString {
    let graph = UsageGraph::build(schema, section);
    debug!(
        options = graph.options.len(),
        components = graph.components.len(),
        chains = graph.chains.len(),
        required = graph.required.iter().filter(|&&required| required).count(),
        "synthesizing usage statement"
    );
    let mut renderer = UsageRenderer {
        graph: &graph,
        styles,
        out: TerminalString::with_indent(section.indent),
    };
    if let Some(program) = &flags.program_name {
        renderer.out.styled(&styles.program, program);
    }
    for chain in &graph.chains {
        for &id in chain {
            renderer.component(id);
        }
    }
    renderer.out
}

#[cfg(test)]
mod tests {
    use option_schema_core::{Positional, Value};

    use super::*;

    fn usage(schema: &Schema) -> String {
        usage_with(schema, &UsageSection::default())
    }

    fn usage_with(schema: &Schema, section: &UsageSection) -> String {
        format_usage(schema, section, &FormatFlags::default(), &HelpStyles::plain())
            .wrap(None, true)
    }

    fn flag(name: &str) -> OptionDef {
        OptionDef::flag().with_names([name])
    }

    #[test]
    fn test_dependencies_precede_their_dependent() {
        let schema = Schema::new()
            .with_option("flag", flag("-f"))
            .with_option("single", OptionDef::single().with_names(["-s"]).with_requires("flag"));
        assert_eq!(usage(&schema), "[-f] -s <param>");
    }

    #[test]
    fn test_required_anchor_requires_its_chain() {
        let schema = Schema::new()
            .with_option("flag", flag("-f"))
            .with_option(
                "single",
                OptionDef::single()
                    .with_names(["-s"])
                    .with_requires("flag")
                    .required(),
            )
            .with_option("other", flag("-x"));
        assert_eq!(usage(&schema), "-f -s <param> [-x]");

        let section = UsageSection {
            required: vec!["single".into()],
            ..Default::default()
        };
        let optional = Schema::new()
            .with_option("flag", flag("-f"))
            .with_option("single", OptionDef::single().with_names(["-s"]).with_requires("flag"));
        assert_eq!(usage_with(&optional, &section), "-f -s <param>");
    }

    #[test]
    fn test_required_options_come_first() {
        let schema = Schema::new()
            .with_option("a", flag("-a"))
            .with_option("b", flag("-b").required());
        assert_eq!(usage(&schema), "-b [-a]");

        let section = UsageSection {
            required: vec!["c".into()],
            ..Default::default()
        };
        let schema = Schema::new()
            .with_option("a", flag("-a"))
            .with_option("b", flag("-b"))
            .with_option("c", flag("-c"));
        assert_eq!(usage_with(&schema, &section), "-c [-a] [-b]");
    }

    #[test]
    fn test_required_member_removes_enclosing_brackets() {
        let schema = Schema::new()
            .with_option("a", flag("-a"))
            .with_option("b", flag("-b").with_requires("a").required())
            .with_option("c", flag("-c"));
        assert_eq!(usage(&schema), "-a -b [-c]");

        let section = UsageSection {
            required: vec!["c".into()],
            ..Default::default()
        };
        assert_eq!(usage_with(&schema, &section), "-a -b -c");
    }

    #[test]
    fn test_mutual_requirements_form_one_unit() {
        let schema = Schema::new()
            .with_option("a", flag("-a").with_requires("b"))
            .with_option("x", flag("-x"))
            .with_option("b", flag("-b").with_requires("a"));
        assert_eq!(usage(&schema), "[-a -b] [-x]");
    }

    #[test]
    fn test_order_follows_dependencies_then_schema() {
        let schema = Schema::new()
            .with_option("late", flag("-l").with_requires("early"))
            .with_option("other", flag("-o"))
            .with_option("early", flag("-e"));
        assert_eq!(usage(&schema), "[-o] [-e] -l");
    }

    #[test]
    fn test_chain_lists_transitive_dependencies() {
        let schema = Schema::new()
            .with_option("a", flag("-a"))
            .with_option("b", flag("-b").with_requires("a"))
            .with_option("c", flag("-c").with_requires(Requirement::all_of(["a".into(), "b".into()])));
        assert_eq!(usage(&schema), "[-a] [-b] -c");
    }

    #[test]
    fn test_inclusive_dependencies() {
        let schema = Schema::new()
            .with_option("a", flag("-a"))
            .with_option("b", flag("-b"))
            .with_option(
                "c",
                flag("-c").with_requires(Requirement::one_of([
                    Requirement::all_of(["a".into(), "b".into()]),
                    "a".into(),
                ])),
            )
            .with_option(
                "d",
                flag("-d").with_requires(Requirement::all_of([
                    !Requirement::key("b"),
                    Requirement::values([("a", RequiredValue::Absent)]),
                ])),
            );
        assert_eq!(usage(&schema), "[-b] [-a] -c [-d]");
    }

    #[test]
    fn test_positional_moves_last() {
        let schema = Schema::new()
            .with_option(
                "file",
                OptionDef::single()
                    .with_names(["-F"])
                    .with_param_name("file")
                    .with_positional(Positional::Plain)
                    .required(),
            )
            .with_option("verbose", flag("-v"))
            .with_option("help", OptionDef::help().with_names(["-h", "--help"]));
        assert_eq!(usage(&schema), "[-v] [-h|--help] [-F] <file>");
    }

    #[test]
    fn test_positional_stays_before_dependents() {
        let schema = Schema::new()
            .with_option(
                "file",
                OptionDef::single().with_positional(Positional::Marker("--".into())),
            )
            .with_option("follow", flag("-f").with_requires("file"))
            .with_option("verbose", flag("-v"));
        assert_eq!(usage(&schema), "[-v] [<param>] -f");
    }

    #[test]
    fn test_alternation_and_stdin() {
        let schema = Schema::new()
            .with_option(
                "input",
                OptionDef::single()
                    .with_names(["-i", "--input"])
                    .with_stdin()
                    .required(),
            )
            .with_option("quiet", OptionDef::flag().with_names(["-q", "--quiet"]));
        assert_eq!(usage(&schema), "((-i|--input) <param>|-) [-q|--quiet]");
    }

    #[test]
    fn test_filter_hidden_and_program_name() {
        let schema = Schema::new()
            .with_option("a", flag("-a"))
            .with_option("b", flag("-b").hidden())
            .with_option("c", flag("-c"))
            .with_option("env", OptionDef::single().with_source("ENV_ONLY").with_default(Value::from(1)));
        let section = UsageSection {
            filter: vec!["c".into()],
            exclude: true,
            ..Default::default()
        };
        let flags = FormatFlags {
            program_name: Some("prog".into()),
            ..Default::default()
        };
        let text = format_usage(&schema, &section, &flags, &HelpStyles::plain());
        assert_eq!(text.wrap(None, true), "prog [-a]");
    }
}
