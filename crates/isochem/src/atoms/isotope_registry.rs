// Standard Library Imports
use std::{fmt, fs, path::Path};

// External Crate Imports
use ahash::{HashMap, HashMapExt};
use itertools::Itertools;
use miette::{Diagnostic, IntoDiagnostic, LabeledSpan, NamedSource, SourceSpan, WrapErr};
use thiserror::Error;
use tracing::debug;

// Local Crate Imports
use crate::{Element, Isotope, IsotopeRegistry, Result, parsers::parse_decoy};

use super::errors::LookupError;

/// The isotope table bundled with this crate, used by `IsotopeRegistry::default()`
pub const DEFAULT_TABLE: &str = include_str!("../../data/isotopes.csv");

// NOTE: Tried in order, so a header line containing commas is always treated as comma-separated
const DELIMITERS: [char; 3] = [',', '\t', ' '];
const COLUMNS: [&str; 4] = ["element", "isotope", "mass", "abundance"];

// Public API ==========================================================================================================

impl IsotopeRegistry {
    /// Builds a registry from delimited text with `element`, `isotope`, `mass`, and `abundance` columns
    ///
    /// The delimiter (a comma, tab, or space) is detected from the header line, and the columns can appear in any
    /// order. `file_name` is only used to label errors.
    pub fn new(file_name: impl AsRef<str>, text: impl AsRef<str>) -> miette::Result<Self> {
        let text = text.as_ref();
        let rows = parse_table(text).map_err(|e| e.finalize(file_name.as_ref(), text))?;
        let registry = Self::from_rows(rows).map_err(|e| e.finalize(file_name.as_ref(), text))?;

        debug!(
            file_name = file_name.as_ref(),
            elements = registry.elements.len(),
            isotopes = registry.isotope_owners.len(),
            "built isotope registry"
        );
        Ok(registry)
    }

    pub fn load(path: impl AsRef<Path>) -> miette::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read the isotope table at {}", path.display()))?;

        Self::new(path.display().to_string(), text)
    }

    /// Finds an element by its symbol, by the symbol of one of its isotopes, or by an `Isotope` or `Element` value
    pub fn lookup<K: ElementKey + ?Sized>(&self, key: &K) -> Result<&Element> {
        key.find_in(self).ok_or_else(|| key.lookup_error().into())
    }

    pub fn contains<K: ElementKey + ?Sized>(&self, key: &K) -> bool {
        key.find_in(self).is_some()
    }

    /// Every element in the registry, sorted by symbol
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .sorted_unstable_by(|a, b| a.symbol.cmp(&b.symbol))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the signed mass shift described by a decoy like `+2Fe` or `-H`
    ///
    /// This is the monoisotopic mass of the element, scaled by the decoy's multiple and sign.
    pub fn mass_shift_for(&self, decoy: impl AsRef<str>) -> Result<f64> {
        let decoy = parse_decoy(decoy)?;
        let monoisotope = self.lookup(decoy.element())?.monoisotope();

        Ok(monoisotope.mass() * f64::from(decoy.multiple()) * decoy.sign() as f64)
    }
}

impl Default for IsotopeRegistry {
    fn default() -> Self {
        // SAFETY: The bundled table is checked by the `default_registry` test below
        Self::new("isotopes.csv", DEFAULT_TABLE).unwrap()
    }
}

/// Anything that can be used to look up an `Element` in an `IsotopeRegistry`
pub trait ElementKey {
    fn find_in<'r>(&self, registry: &'r IsotopeRegistry) -> Option<&'r Element>;

    fn lookup_error(&self) -> LookupError;
}

impl ElementKey for str {
    fn find_in<'r>(&self, registry: &'r IsotopeRegistry) -> Option<&'r Element> {
        registry.elements.get(self).or_else(|| {
            let owner = registry.isotope_owners.get(self)?;
            registry.elements.get(owner)
        })
    }

    fn lookup_error(&self) -> LookupError {
        LookupError::element(self)
    }
}

impl ElementKey for String {
    fn find_in<'r>(&self, registry: &'r IsotopeRegistry) -> Option<&'r Element> {
        self.as_str().find_in(registry)
    }

    fn lookup_error(&self) -> LookupError {
        self.as_str().lookup_error()
    }
}

impl ElementKey for Isotope {
    fn find_in<'r>(&self, registry: &'r IsotopeRegistry) -> Option<&'r Element> {
        let owner = registry.isotope_owners.get(self.symbol())?;
        registry.elements.get(owner).filter(|e| e.contains(self))
    }

    fn lookup_error(&self) -> LookupError {
        LookupError::isotope(self.symbol())
    }
}

impl ElementKey for Element {
    fn find_in<'r>(&self, registry: &'r IsotopeRegistry) -> Option<&'r Element> {
        registry.elements.get(self.symbol()).filter(|&e| e == self)
    }

    fn lookup_error(&self) -> LookupError {
        LookupError::element(self.symbol())
    }
}

// Table Parsing =======================================================================================================

#[derive(Debug)]
struct IsotopeRow<'t> {
    element: &'t str,
    isotope: Isotope,
    span: SourceSpan,
}

fn parse_table(text: &str) -> Result<Vec<IsotopeRow<'_>>, RegistryErrorKind> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or(RegistryErrorKind::EmptyTable)?;
    let delimiter = sniff_delimiter(header);

    let header_fields = split_fields(header, delimiter);
    let mut columns = [0; COLUMNS.len()];
    for (column, name) in columns.iter_mut().zip(COLUMNS) {
        *column = header_fields
            .iter()
            .position(|&f| f == name)
            .ok_or_else(|| RegistryErrorKind::MissingColumn(span_of(text, header), name))?;
    }

    let rows = lines
        .map(|line| parse_row(text, line, delimiter, header_fields.len(), columns))
        .collect::<Result<Vec<_>, _>>()?;
    if rows.is_empty() {
        return Err(RegistryErrorKind::EmptyTable);
    }

    Ok(rows)
}

fn parse_row<'t>(
    text: &'t str,
    line: &'t str,
    delimiter: char,
    n_columns: usize,
    [element_column, isotope_column, mass_column, abundance_column]: [usize; COLUMNS.len()],
) -> Result<IsotopeRow<'t>, RegistryErrorKind> {
    let span = span_of(text, line);
    let fields = split_fields(line, delimiter);
    if fields.len() != n_columns {
        return Err(RegistryErrorKind::FieldCount(span, n_columns, fields.len()));
    }

    let symbol = |column: usize, name| {
        let field = fields[column];
        if field.is_empty() {
            Err(RegistryErrorKind::EmptySymbol(span, name))
        } else {
            Ok(field)
        }
    };
    let number = |column: usize| {
        let field = fields[column];
        field
            .parse::<f64>()
            .map_err(|_| RegistryErrorKind::InvalidNumber(span_of(text, field), field.to_owned()))
    };

    let element = symbol(element_column, "element")?;
    let isotope = symbol(isotope_column, "isotope")?;
    let mass = number(mass_column)?;
    let abundance = number(abundance_column)?;
    if !(mass.is_finite() && mass > 0.0) {
        return Err(RegistryErrorKind::InvalidMass(span_of(text, fields[mass_column]), mass));
    }
    if !(abundance > 0.0 && abundance <= 1.0) {
        return Err(RegistryErrorKind::InvalidAbundance(span_of(text, fields[abundance_column]), abundance));
    }

    Ok(IsotopeRow {
        element,
        isotope: Isotope::new(isotope, mass, abundance),
        span,
    })
}

fn sniff_delimiter(header: &str) -> char {
    DELIMITERS
        .into_iter()
        .find(|&d| header.contains(d))
        .unwrap_or(DELIMITERS[0])
}

fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter)
        .map(str::trim)
        // NOTE: Runs of spaces are treated as a single delimiter, but empty comma or tab separated fields are kept
        .filter(|f| delimiter != ' ' || !f.is_empty())
        .collect()
}

// NOTE: Only valid when `slice` is a substring of `text`, which holds for everything produced by `str::lines()` and
// `str::split()` above
fn span_of(text: &str, slice: &str) -> SourceSpan {
    let start = slice.as_ptr() as usize - text.as_ptr() as usize;
    SourceSpan::from(start..start + slice.len())
}

impl IsotopeRegistry {
    fn from_rows(rows: Vec<IsotopeRow<'_>>) -> Result<Self, RegistryErrorKind> {
        let mut first_seen: HashMap<&str, SourceSpan> = HashMap::with_capacity(rows.len());
        let mut isotope_owners = HashMap::with_capacity(rows.len());
        for row in &rows {
            let symbol = row.isotope.symbol();
            if let Some(&first) = first_seen.get(symbol) {
                return Err(RegistryErrorKind::DuplicateIsotope(first, row.span, symbol.to_owned()));
            }
            first_seen.insert(symbol, row.span);
            isotope_owners.insert(symbol.to_owned(), row.element.to_owned());
        }

        let elements = rows
            .into_iter()
            .into_group_map_by(|row| row.element)
            .into_iter()
            .filter_map(|(symbol, rows)| {
                let element = Element::new(symbol, rows.into_iter().map(|row| row.isotope))?;
                Some((symbol.to_owned(), element))
            })
            .collect();

        Ok(Self {
            elements,
            isotope_owners,
        })
    }
}

// Validation Error Types and Trait Implementations ====================================================================

#[derive(Debug, Error)]
#[error("failed to load isotope table")]
struct RegistryError {
    table: NamedSource<String>,
    #[source]
    kind: RegistryErrorKind,
}

// NOTE: This is manually implemented because the list of labels is dynamic and needs to be extracted from `self.kind`
impl Diagnostic for RegistryError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.table)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(
            self.kind
                .labels()
                .into_iter()
                .map(|(s, l)| LabeledSpan::new_with_span(Some(l.to_owned()), s)),
        ))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help()
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        Some(&self.kind)
    }
}

#[derive(Clone, Debug, Diagnostic, Error)]
enum RegistryErrorKind {
    #[error("the isotope table doesn't contain any isotopes")]
    #[diagnostic(help("add a header line naming the element, isotope, mass, and abundance columns, then some rows"))]
    EmptyTable,

    #[error("the isotope table is missing a {1:?} column")]
    #[diagnostic(help("the header must name the element, isotope, mass, and abundance columns"))]
    MissingColumn(SourceSpan, &'static str),

    #[error("expected {1} fields, but found {2}")]
    #[diagnostic(help("every row needs a value for each column named in the header"))]
    FieldCount(SourceSpan, usize, usize),

    #[error("the {1} column can't be empty")]
    EmptySymbol(SourceSpan, &'static str),

    #[error("{1:?} is not a valid number")]
    InvalidNumber(SourceSpan, String),

    #[error("isotope masses must be positive, but found {1}")]
    InvalidMass(SourceSpan, f64),

    #[error("natural abundances must lie between 0 (exclusive) and 1, but found {1}")]
    #[diagnostic(help("abundances are fractions, so percentages need dividing by 100"))]
    InvalidAbundance(SourceSpan, f64),

    #[error("the isotope {2:?} has already been defined")]
    #[diagnostic(help("remove the duplicate row, or double-check the isotope symbol for typos"))]
    DuplicateIsotope(SourceSpan, SourceSpan, String),
}

impl RegistryErrorKind {
    fn labels(&self) -> Vec<(SourceSpan, &'static str)> {
        match *self {
            Self::EmptyTable => Vec::new(),
            Self::MissingColumn(s, _) => vec![(s, "header")],
            Self::FieldCount(s, _, _) => vec![(s, "wrong number of fields")],
            Self::EmptySymbol(s, _) => vec![(s, "empty field")],
            Self::InvalidNumber(s, _) => vec![(s, "expected a number")],
            Self::InvalidMass(s, _) => vec![(s, "invalid mass")],
            Self::InvalidAbundance(s, _) => vec![(s, "invalid abundance")],
            Self::DuplicateIsotope(s1, s2, _) => vec![(s1, "first defined here"), (s2, "then again here")],
        }
    }

    fn finalize(self, file_name: &str, text: &str) -> RegistryError {
        let table = NamedSource::new(file_name, text.to_owned());
        RegistryError { table, kind: self }
    }
}

// Module Tests ========================================================================================================
