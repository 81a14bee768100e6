use itertools::Itertools;
use lstar_core::prelude::*;
use owo_colors::OwoColorize;
use tracing::{debug, trace};

use crate::{
    error::{LearningError, Violation},
    oracle::{MembershipOracle, OracleError},
};

/// Rows are identified by the order in which they were created.
pub type RowId = usize;

/// Identifies a class of rows that have the same content.
pub type ContentId = usize;

/// A row of an [`ObservationTable`]. Short rows are the candidate states of a hypothesis, long
/// rows only exist to observe the successors of short rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<S: Symbol> {
    label: Word<S>,
    short: bool,
    content: ContentId,
    successors: Vec<RowId>,
}

impl<S: Symbol> Row<S> {
    /// The access word that labels the row.
    pub fn label(&self) -> &Word<S> {
        &self.label
    }

    /// Returns `true` if the row is a short row.
    pub fn is_short(&self) -> bool {
        self.short
    }

    /// Identifier of the content vector of the row. Two rows have the same content id iff
    /// they agree on every column.
    pub fn content_id(&self) -> ContentId {
        self.content
    }

    /// The rows labeled by the one-symbol extensions of this row, in alphabet order. Empty for
    /// long rows.
    pub fn successors(&self) -> &[RowId] {
        &self.successors
    }

    /// The row labeled by this row's label followed by the symbol with index `symbol`.
    pub fn successor(&self, symbol: usize) -> Option<RowId> {
        self.successors.get(symbol).copied()
    }
}

/// A short row with a successor whose content matches no short row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclosedRow {
    /// The short row.
    pub short: RowId,
    /// Index of the symbol leading to the successor.
    pub symbol: usize,
    /// The successor that has no counterpart among the short rows.
    pub successor: RowId,
}

/// Two short rows with equal content whose successors on `symbol` have different content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inconsistency {
    /// The short row that was created first.
    pub first: RowId,
    /// The other short row.
    pub second: RowId,
    /// Index of the symbol on which the successors differ.
    pub symbol: usize,
}

/// The observation table of L*. Rows are labeled by prefixes, columns by suffixes and the
/// cell for prefix `u` and suffix `v` holds the part of the answer to `uv` that `v` is
/// responsible for, see [`Output::tail`].
///
/// Rows with equal content are interned to the same [`ContentId`]. The table answers all
/// queries that a change requires before it applies the change, so a failing oracle leaves
/// the table untouched.
#[derive(Debug, Clone)]
pub struct ObservationTable<S: Symbol, O: Output> {
    alphabet: Alphabet<S>,
    suffixes: Vec<Word<S>>,
    rows: Vec<Row<S>>,
    labels: math::Map<Word<S>, RowId>,
    short: Vec<RowId>,
    contents: math::HashBijection<ContentId, Vec<O>>,
}

fn query<S, O, M>(oracle: &mut M, label: &Word<S>, suffix: &Word<S>) -> Result<O, OracleError>
where
    S: Symbol,
    O: Output,
    M: MembershipOracle<Symbol = S, Output = O>,
{
    let word = label.concat(suffix);
    let answer = oracle.answer(&word)?;
    trace!("query {word} is answered with {}", answer.show());
    Ok(answer.tail(suffix.len()))
}

impl<S: Symbol, O: Output> ObservationTable<S, O> {
    /// Creates a table without rows and columns.
    pub fn new(alphabet: Alphabet<S>) -> Self {
        Self {
            alphabet,
            suffixes: vec![],
            rows: vec![],
            labels: math::Map::default(),
            short: vec![],
            contents: math::HashBijection::new(),
        }
    }

    /// Seeds the table. Every word in `prefixes` becomes a short row, its one-symbol
    /// extensions become long rows unless they are short rows themselves, and every row is
    /// queried for every suffix.
    pub fn initialize<M>(
        &mut self,
        prefixes: Vec<Word<S>>,
        suffixes: Vec<Word<S>>,
        oracle: &mut M,
    ) -> Result<(), LearningError>
    where
        M: MembershipOracle<Symbol = S, Output = O>,
    {
        self.add_suffixes(suffixes, oracle)?;
        self.add_short_prefixes(prefixes, oracle)?;
        debug!(
            "initialized table with {} rows and {} columns",
            self.rows.len(),
            self.suffixes.len()
        );
        Ok(())
    }

    /// Appends the given suffixes as columns, skipping those that are present already. Every
    /// existing row is queried for the new columns. Returns the suffixes that were added.
    pub fn add_suffixes<M, I>(
        &mut self,
        suffixes: I,
        oracle: &mut M,
    ) -> Result<Vec<Word<S>>, LearningError>
    where
        M: MembershipOracle<Symbol = S, Output = O>,
        I: IntoIterator<Item = Word<S>>,
    {
        let fresh = suffixes
            .into_iter()
            .filter(|s| !self.suffixes.contains(s))
            .unique()
            .collect_vec();
        if fresh.is_empty() {
            return Ok(fresh);
        }
        if let Some(foreign) = fresh.iter().find(|s| !self.alphabet.covers(s)) {
            return Err(Violation::ForeignWord(foreign.show()).into());
        }

        let mut updates = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut outputs = Vec::with_capacity(fresh.len());
            for suffix in &fresh {
                outputs.push(query(oracle, &row.label, suffix)?);
            }
            updates.push(outputs);
        }

        self.suffixes.extend(fresh.iter().cloned());
        let contents = updates
            .into_iter()
            .enumerate()
            .map(|(id, outputs)| {
                let mut content = self.row_contents(id).to_vec();
                content.extend(outputs);
                content
            })
            .collect_vec();
        // the old contents are no longer the content of any row
        self.contents = math::HashBijection::new();
        for (id, content) in contents.into_iter().enumerate() {
            self.rows[id].content = self.intern(content);
        }
        debug!(
            "added columns {}, rows now have {} distinct contents",
            fresh.iter().join(", "),
            self.number_of_contents()
        );
        Ok(fresh)
    }

    /// Turns the given words into short rows. A word that is not yet a row is created, and
    /// for every new short row the missing one-symbol extensions are created as long rows.
    /// Returns the rows that became short, in the order in which they did.
    pub fn add_short_prefixes<M, I>(
        &mut self,
        prefixes: I,
        oracle: &mut M,
    ) -> Result<Vec<RowId>, LearningError>
    where
        M: MembershipOracle<Symbol = S, Output = O>,
        I: IntoIterator<Item = Word<S>>,
    {
        let mut promote = vec![];
        let mut planned = math::Set::default();
        let mut fresh = vec![];
        let mut created = math::Set::default();

        for word in prefixes {
            if !self.alphabet.covers(&word) {
                return Err(Violation::ForeignWord(word.show()).into());
            }
            let is_short = self.find_row(&word).is_some_and(|id| self.rows[id].short);
            if is_short || !planned.insert(word.clone()) {
                continue;
            }
            let extensions = self.alphabet.symbols().map(|a| word.append(a.clone()));
            for label in std::iter::once(word.clone()).chain(extensions) {
                if !self.labels.contains_key(&label) && created.insert(label.clone()) {
                    fresh.push(label);
                }
            }
            promote.push(word);
        }

        let mut answers = Vec::with_capacity(fresh.len());
        for label in &fresh {
            answers.push(self.query_row(label, oracle)?);
        }
        for (label, content) in fresh.into_iter().zip(answers) {
            self.insert_row(label, content);
        }

        let mut promoted = Vec::with_capacity(promote.len());
        for word in promote {
            let id = self.row_id(&word)?;
            let successors = self
                .alphabet
                .symbols()
                .map(|a| self.row_id(&word.append(a.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            let row = &mut self.rows[id];
            row.short = true;
            row.successors = successors;
            self.short.push(id);
            promoted.push(id);
        }
        if !promoted.is_empty() {
            debug!(
                "promoted {} to short rows",
                promoted.iter().map(|id| &self.rows[*id].label).join(", ")
            );
        }
        Ok(promoted)
    }

    /// Returns `true` if every successor of a short row has the content of some short row.
    pub fn is_closed(&self) -> bool {
        self.find_unclosed_row().is_none()
    }

    /// Finds the first short row, in the order in which rows became short, that has a
    /// successor whose content matches no short row.
    pub fn find_unclosed_row(&self) -> Option<UnclosedRow> {
        let known: math::Set<_> = self.short.iter().map(|id| self.rows[*id].content).collect();
        self.short.iter().find_map(|&short| {
            self.rows[short]
                .successors
                .iter()
                .enumerate()
                .find(|(_, successor)| !known.contains(&self.rows[**successor].content))
                .map(|(symbol, successor)| UnclosedRow {
                    short,
                    symbol,
                    successor: *successor,
                })
        })
    }

    /// Returns `true` if all short rows with equal content have successors with equal content.
    pub fn is_consistent(&self) -> bool {
        self.find_inconsistency().is_none()
    }

    /// Finds the first pair of short rows, in the order in which rows became short, that
    /// have equal content but successors with different content.
    pub fn find_inconsistency(&self) -> Option<Inconsistency> {
        for (i, &first) in self.short.iter().enumerate() {
            for &second in &self.short[i + 1..] {
                let (left, right) = (&self.rows[first], &self.rows[second]);
                if left.content != right.content {
                    continue;
                }
                let differing = left
                    .successors
                    .iter()
                    .zip(&right.successors)
                    .position(|(l, r)| self.rows[*l].content != self.rows[*r].content);
                if let Some(symbol) = differing {
                    trace!(
                        "rows {} and {} are inconsistent on {}",
                        left.label,
                        right.label,
                        self.alphabet.nth(symbol).map(Show::show).unwrap_or_default()
                    );
                    return Some(Inconsistency {
                        first,
                        second,
                        symbol,
                    });
                }
            }
        }
        None
    }

    /// Returns the alphabet.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The columns, in the order in which they were added.
    pub fn suffixes(&self) -> &[Word<S>] {
        &self.suffixes
    }

    /// Position of the column for `suffix`.
    pub fn column_of(&self, suffix: &Word<S>) -> Option<usize> {
        self.suffixes.iter().position(|s| s == suffix)
    }

    /// All rows, in the order in which they were created.
    pub fn rows(&self) -> &[Row<S>] {
        &self.rows
    }

    /// The short rows, in the order in which they became short.
    pub fn short_rows(&self) -> &[RowId] {
        &self.short
    }

    /// The long rows, in the order in which they were created.
    pub fn long_rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.short)
            .map(|(id, _)| id)
    }

    /// Returns the row with the given id. Panics if it does not exist.
    pub fn row(&self, id: RowId) -> &Row<S> {
        &self.rows[id]
    }

    /// Looks up the row labeled by `label`.
    pub fn find_row(&self, label: &Word<S>) -> Option<RowId> {
        self.labels.get(label).copied()
    }

    /// The content vector of a row, one entry per column.
    pub fn row_contents(&self, row: RowId) -> &[O] {
        self.contents
            .get_by_left(&self.rows[row].content)
            .expect("content of every row is interned")
    }

    /// The cell of `row` in the given column.
    pub fn cell_contents(&self, row: RowId, column: usize) -> Option<&O> {
        self.row_contents(row).get(column)
    }

    /// Number of rows.
    pub fn number_of_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn number_of_suffixes(&self) -> usize {
        self.suffixes.len()
    }

    /// Number of distinct contents among all rows.
    pub fn number_of_contents(&self) -> usize {
        self.contents.len()
    }

    /// Number of distinct content ids among the short rows, which is the number of states
    /// that a hypothesis built from the table has.
    pub fn number_of_states(&self) -> usize {
        self.short
            .iter()
            .map(|id| self.rows[*id].content)
            .unique()
            .count()
    }

    /// Builds the open hypothesis of the table. In contrast to a proper hypothesis it also has
    /// a state for every content that only occurs in long rows, such states have no outgoing
    /// transitions.
    pub fn partial_model(&self) -> PartialModel<S> {
        let mut state_of = math::Map::default();
        let mut access = vec![];
        let mut open = vec![];
        for id in self.short.iter().copied().chain(self.long_rows()) {
            let row = &self.rows[id];
            if !state_of.contains_key(&row.content) {
                state_of.insert(row.content, access.len());
                access.push(row.label.clone());
                open.push(!row.short);
            }
        }

        let mut transitions = vec![vec![None; self.alphabet.size()]; access.len()];
        let mut initial = None;
        for &id in &self.short {
            let row = &self.rows[id];
            let state = state_of[&row.content];
            if row.label.is_empty() {
                initial = Some(state);
            }
            for (i, successor) in row.successors.iter().enumerate() {
                if transitions[state][i].is_none() {
                    transitions[state][i] = Some(state_of[&self.rows[*successor].content]);
                }
            }
        }

        PartialModel {
            alphabet: self.alphabet.clone(),
            access,
            open,
            transitions,
            initial,
        }
    }

    /// Renders the table with colored short rows.
    pub fn to_colored_string(&self) -> String {
        self.render(true)
    }

    fn query_row<M>(&self, label: &Word<S>, oracle: &mut M) -> Result<Vec<O>, OracleError>
    where
        M: MembershipOracle<Symbol = S, Output = O>,
    {
        self.suffixes
            .iter()
            .map(|suffix| query(oracle, label, suffix))
            .collect()
    }

    fn row_id(&self, label: &Word<S>) -> Result<RowId, Violation> {
        self.find_row(label)
            .ok_or_else(|| Violation::MissingRow(label.show()))
    }

    fn insert_row(&mut self, label: Word<S>, content: Vec<O>) -> RowId {
        let id = self.rows.len();
        let content = self.intern(content);
        trace!("adding row {label} with content id {content}");
        self.rows.push(Row {
            label: label.clone(),
            short: false,
            content,
            successors: vec![],
        });
        self.labels.insert(label, id);
        id
    }

    fn intern(&mut self, content: Vec<O>) -> ContentId {
        if let Some(id) = self.contents.get_by_right(&content) {
            return *id;
        }
        let id = self.contents.len();
        self.contents.insert(id, content);
        id
    }

    fn render(&self, colored: bool) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            ["row".to_string(), "prefix".to_string()]
                .into_iter()
                .chain(self.suffixes.iter().map(Word::as_string))
                .chain(std::iter::once("id".to_string())),
        );
        for id in self.short.iter().copied().chain(self.long_rows()) {
            let row = &self.rows[id];
            let label = match (colored, row.short) {
                (true, true) => row.label.as_string().blue().bold().to_string(),
                _ => row.label.as_string(),
            };
            let kind = if row.short { "short" } else { "long" };
            let mut record = vec![kind.to_string(), label];
            record.extend(self.row_contents(id).iter().map(Show::show));
            record.push(row.content.to_string());
            builder.push_record(record);
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl<S: Symbol, O: Output> std::fmt::Display for ObservationTable<S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

/// The open hypothesis of an [`ObservationTable`], see
/// [`ObservationTable::partial_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialModel<S: Symbol> {
    alphabet: Alphabet<S>,
    access: Vec<Word<S>>,
    open: Vec<bool>,
    transitions: Vec<Vec<Option<StateIndex>>>,
    initial: Option<StateIndex>,
}

impl<S: Symbol> PartialModel<S> {
    /// Number of states.
    pub fn size(&self) -> usize {
        self.access.len()
    }

    /// The state of the empty word, if it is a short row.
    pub fn initial(&self) -> Option<StateIndex> {
        self.initial
    }

    /// Label of the first row that has the content of `state`.
    pub fn access_word(&self, state: StateIndex) -> Option<&Word<S>> {
        self.access.get(state)
    }

    /// Returns `true` if `state` only occurs in long rows.
    pub fn is_open(&self, state: StateIndex) -> bool {
        self.open.get(state).copied().unwrap_or(false)
    }

    /// Number of states that only occur in long rows.
    pub fn open_states(&self) -> usize {
        self.open.iter().filter(|open| **open).count()
    }

    /// The successor of `state` on the symbol with index `symbol`, if it is known.
    pub fn successor(&self, state: StateIndex, symbol: usize) -> Option<StateIndex> {
        *self.transitions.get(state)?.get(symbol)?
    }
}

impl<S: Symbol> std::fmt::Display for PartialModel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet.symbols().map(Show::show)),
        );
        for (state, access) in self.access.iter().enumerate() {
            let marker = if Some(state) == self.initial { "→ " } else { "" };
            let open = if self.open[state] { " (open)" } else { "" };
            let mut record = vec![format!("{marker}q{state} [{access}]{open}")];
            record.extend(self.transitions[state].iter().map(|target| match target {
                Some(target) => format!("q{target}"),
                None => "-".to_string(),
            }));
            builder.push_record(record);
        }
        write!(
            f,
            "{}",
            builder.build().with(tabled::settings::Style::rounded())
        )
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use lstar_core::prelude::*;

    use super::{Inconsistency, ObservationTable, UnclosedRow};
    use crate::{
        error::{LearningError, Violation},
        oracle::SimulatorOracle,
    };

    /// Accepts all words with an even number of `a`s.
    fn even_as() -> Dfa<char> {
        Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true, false],
            [(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)],
            0,
        )
        .unwrap()
    }

    /// Accepts precisely `ε` and `a`.
    fn epsilon_or_a() -> Dfa<char> {
        Dfa::from_parts(
            Alphabet::of_size(2),
            vec![true, true, false],
            [
                (0, 'a', 1),
                (0, 'b', 2),
                (1, 'a', 2),
                (1, 'b', 2),
                (2, 'a', 2),
                (2, 'b', 2),
            ],
            0,
        )
        .unwrap()
    }

    #[test_log::test]
    fn initializing_and_closing() {
        let mut oracle = SimulatorOracle::new(even_as());
        let mut table = ObservationTable::new(Alphabet::of_size(2));
        table
            .initialize(vec![Word::epsilon()], vec![Word::epsilon()], &mut oracle)
            .unwrap();

        assert_eq!(table.number_of_rows(), 3);
        assert_eq!(table.number_of_suffixes(), 1);
        let eps = table.find_row(&Word::epsilon()).unwrap();
        let a = table.find_row(&Word::from("a")).unwrap();
        let b = table.find_row(&Word::from("b")).unwrap();
        assert_eq!(table.row_contents(eps), &[true]);
        assert_eq!(table.row_contents(a), &[false]);
        assert_eq!(table.row(eps).content_id(), table.row(b).content_id());
        assert_eq!(table.short_rows(), &[eps]);
        assert_eq!(table.long_rows().collect::<Vec<_>>(), vec![a, b]);

        assert!(!table.is_closed());
        assert_eq!(
            table.find_unclosed_row(),
            Some(UnclosedRow {
                short: eps,
                symbol: 0,
                successor: a
            })
        );
        let model = table.partial_model();
        assert_eq!(model.size(), 2);
        assert_eq!(model.open_states(), 1);
        assert_eq!(model.successor(0, 0), Some(1));
        assert_eq!(model.successor(1, 0), None);

        let promoted = table
            .add_short_prefixes([Word::from("a")], &mut oracle)
            .unwrap();
        assert_eq!(promoted, vec![a]);
        assert!(table.row(a).is_short());
        assert_eq!(table.number_of_rows(), 5);
        assert!(table.is_closed());
        assert!(table.is_consistent());
        assert_eq!(table.number_of_states(), 2);

        assert!(table
            .add_short_prefixes([Word::from("a"), Word::epsilon()], &mut oracle)
            .unwrap()
            .is_empty());
    }

    #[test_log::test]
    fn adding_columns_splits_rows() {
        let mut oracle = SimulatorOracle::new(epsilon_or_a());
        let mut table = ObservationTable::new(Alphabet::of_size(2));
        table
            .initialize(
                vec![Word::epsilon(), Word::from("a")],
                vec![Word::epsilon(), Word::from("b")],
                &mut oracle,
            )
            .unwrap();

        let eps = table.find_row(&Word::epsilon()).unwrap();
        let a = table.find_row(&Word::from("a")).unwrap();
        assert_eq!(table.row_contents(eps), &[true, false]);
        assert_eq!(table.row_contents(a), &[true, false]);
        assert_eq!(
            table.find_inconsistency(),
            Some(Inconsistency {
                first: eps,
                second: a,
                symbol: 0
            })
        );

        let added = table
            .add_suffixes([Word::from("a"), Word::from("b"), Word::from("a")], &mut oracle)
            .unwrap();
        assert_eq!(added, vec![Word::from("a")]);
        assert_eq!(table.row_contents(eps), &[true, false, true]);
        assert_eq!(table.row_contents(a), &[true, false, false]);
        assert_ne!(table.row(eps).content_id(), table.row(a).content_id());
        assert_eq!(table.cell_contents(a, 2), Some(&false));
        assert_eq!(table.column_of(&Word::from("a")), Some(2));
        assert_eq!(table.number_of_contents(), 3);
        assert_eq!(
            table.number_of_contents(),
            (0..table.number_of_rows())
                .map(|id| table.row(id).content_id())
                .unique()
                .count()
        );
    }

    #[test]
    fn foreign_words_are_rejected() {
        let mut oracle = SimulatorOracle::new(even_as());
        let mut table = ObservationTable::new(Alphabet::of_size(2));
        table
            .initialize(vec![Word::epsilon()], vec![Word::epsilon()], &mut oracle)
            .unwrap();
        assert_eq!(
            table.add_suffixes([Word::from("ac")], &mut oracle),
            Err(LearningError::InvariantViolation(Violation::ForeignWord(
                "ac".into()
            )))
        );
        assert_eq!(table.number_of_suffixes(), 1);
    }

    #[test]
    fn rendering() {
        let mut oracle = SimulatorOracle::new(even_as());
        let mut table = ObservationTable::new(Alphabet::of_size(2));
        table
            .initialize(vec![Word::epsilon()], vec![Word::epsilon()], &mut oracle)
            .unwrap();
        let rendered = table.to_string();
        assert!(rendered.contains("short"));
        assert!(rendered.contains("long"));
        assert!(rendered.contains('ε'));
        assert!(table.partial_model().to_string().contains("(open)"));
    }
}
