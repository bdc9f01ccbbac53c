//! DIMACS CNF reader and writer for boolcalc clause streams.
//!
//! The reader turns a DIMACS CNF file into a stream of
//! [`Clause`](boolcalc::Clause)s over a caller-supplied domain, mapping the
//! 1-based variable numbers through [`Domain::unpack`](boolcalc::Domain::unpack)
//! (which auto-vivifies unknown numbers on an unfrozen domain). The writer
//! does the reverse with `pack`.
//!
//! One clause per line: the DIMACS format itself allows a clause to span
//! several lines, but this implementation requires each clause to end on
//! the line it started. Such input is not detected and is read incorrectly,
//! a documented limitation.

use std::convert::TryFrom;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use boolcalc::stream::Cached;
use boolcalc::{Clause, Domain, DomainError, Formula};

/// Possible errors while reading a DIMACS CNF file.
#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("line {line}: invalid literal `{token}`")]
    InvalidLiteral { line: usize, token: String },
    #[error("line {line}: invalid header: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: clause not terminated by 0")]
    UnterminatedClause { line: usize },
    /// Resolving a variable number failed, e.g. on a frozen domain.
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Variable and clause count of a `p cnf` header line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub var_count: usize,
    pub clause_count: usize,
}

/// A lazy stream of the clauses of a DIMACS CNF input.
///
/// Blank lines and `c `-comments are skipped; the `p cnf` header is parsed
/// and exposed via [`header`](DimacsReader::header) but its counts are not
/// enforced. I/O errors are propagated unchanged.
pub struct DimacsReader<R> {
    input: R,
    domain: Arc<Domain>,
    header: Option<Header>,
    line: usize,
}

impl<R: BufRead> DimacsReader<R> {
    pub fn new(input: R, domain: &Arc<Domain>) -> DimacsReader<R> {
        DimacsReader {
            input,
            domain: Arc::clone(domain),
            header: None,
            line: 0,
        }
    }

    /// The header, once one has been read.
    pub fn header(&self) -> Option<Header> {
        self.header
    }

    fn parse_header(&mut self, line: &str) -> Result<(), DimacsError> {
        let invalid = || DimacsError::InvalidHeader {
            line: self.line,
            header: line.to_string(),
        };
        if self.header.is_some() {
            return Err(invalid());
        }

        let mut fields = line.split_whitespace();
        if fields.next() != Some("p") || fields.next() != Some("cnf") {
            return Err(invalid());
        }
        let var_count = fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(invalid)?;
        let clause_count = fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or_else(invalid)?;
        if fields.next().is_some() {
            return Err(invalid());
        }

        self.header = Some(Header {
            var_count,
            clause_count,
        });
        Ok(())
    }

    fn parse_clause(&self, line: &str) -> Result<Clause, DimacsError> {
        let mut clause = Clause::new();
        for token in line.split_whitespace() {
            let literal: i64 = token.parse().map_err(|_| DimacsError::InvalidLiteral {
                line: self.line,
                token: token.to_string(),
            })?;
            if literal == 0 {
                // Anything after the terminating zero would be part of a
                // second clause on the same line, which the line-based
                // reader cannot represent; it is ignored.
                return Ok(clause);
            }
            let nr = u32::try_from(literal.abs()).map_err(|_| DimacsError::InvalidLiteral {
                line: self.line,
                token: token.to_string(),
            })?;
            let var = self.domain.unpack(nr)?;
            clause.set(var, literal > 0);
        }
        Err(DimacsError::UnterminatedClause { line: self.line })
    }
}

impl<R: BufRead> Iterator for DimacsReader<R> {
    type Item = Result<Clause, DimacsError>;

    fn next(&mut self) -> Option<Result<Clause, DimacsError>> {
        loop {
            let mut buf = String::new();
            match self.input.read_line(&mut buf) {
                Err(err) => return Some(Err(err.into())),
                Ok(0) => return None,
                Ok(_) => {}
            }
            self.line += 1;

            let line = buf.trim_end();
            if line.is_empty() || line.starts_with("c ") {
                continue;
            }
            if line.starts_with('p') {
                if let Err(err) = self.parse_header(line) {
                    return Some(Err(err));
                }
                continue;
            }
            return Some(self.parse_clause(line));
        }
    }
}

/// Reads a whole DIMACS CNF input into a formula over `domain`.
///
/// The formula is the conjunction of the clause disjunctions; an input
/// without clauses reads as `\T`.
pub fn read(input: impl BufRead, domain: &Arc<Domain>) -> Result<Formula, DimacsError> {
    let mut reader = DimacsReader::new(input, domain);
    let mut clauses = Vec::new();
    for clause in &mut reader {
        clauses.push(clause?);
    }
    if let Some(header) = reader.header() {
        debug!(
            "dimacs input declared {} variables and {} clauses, read {}",
            header.var_count,
            header.clause_count,
            clauses.len()
        );
    }
    Ok(Formula::from_clauses(clauses, domain))
}

/// Writes `c `-prefixed comment lines.
pub fn write_comments(target: &mut impl Write, comments: &[String]) -> io::Result<()> {
    for comment in comments {
        writeln!(target, "c {}", comment)?;
    }
    Ok(())
}

/// Writes a `p cnf` header line.
pub fn write_header(target: &mut impl Write, header: Header) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", header.var_count, header.clause_count)
}

/// Writes clauses as space-separated, zero-terminated literal lines.
pub fn write_clauses(
    target: &mut impl Write,
    clauses: impl IntoIterator<Item = Clause>,
    domain: &Domain,
) -> io::Result<()> {
    for clause in clauses {
        for (var, sign) in clause.iter() {
            let mut nr = i64::from(domain.pack(var));
            if !sign {
                nr = -nr;
            }
            itoa::write(&mut *target, nr)?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Writes a clause stream as a complete DIMACS CNF file.
///
/// The stream is exhausted once up front to count the clauses and find the
/// largest packed variable number for the header, then replayed from the
/// cache.
pub fn write(
    target: &mut impl Write,
    clauses: impl IntoIterator<Item = Clause>,
    domain: &Domain,
    comments: &[String],
) -> io::Result<()> {
    let mut cached = Cached::new(clauses.into_iter());
    let clause_count = cached.cache_all();
    let var_count = cached
        .cached()
        .iter()
        .flat_map(|clause| clause.vars().iter())
        .map(|var| domain.pack(var))
        .max()
        .unwrap_or(0);

    write_with_header(
        target,
        cached,
        domain,
        comments,
        Header {
            var_count: var_count as usize,
            clause_count,
        },
    )
}

/// Like [`write`], but with a caller-supplied header instead of one
/// computed from the stream.
pub fn write_with_header(
    target: &mut impl Write,
    clauses: impl IntoIterator<Item = Clause>,
    domain: &Domain,
    comments: &[String],
    header: Header,
) -> io::Result<()> {
    write_comments(target, comments)?;
    write_header(target, header)?;
    write_clauses(target, clauses, domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;

    fn fresh_domain() -> Arc<Domain> {
        Arc::new(Domain::new())
    }

    #[test]
    fn reads_equivalence_of_two_variables() -> Result<(), Error> {
        let input = b"p cnf 2 2\n1 -2 0\n-1 2 0\n";
        let domain = fresh_domain();
        let formula = read(&input[..], &domain)?;

        let a = domain.unpack(1)?;
        let b = domain.unpack(2)?;
        assert_eq!(a.name(), "1");
        assert_eq!(b.name(), "2");

        let satisfying: Vec<_> = formula
            .truthtable()
            .filter(|(_, value)| *value)
            .map(|(assign, _)| (assign.get(&a).unwrap(), assign.get(&b).unwrap()))
            .collect();
        assert_eq!(satisfying, [(false, false), (true, true)]);
        Ok(())
    }

    #[test]
    fn skips_blanks_and_comments() -> Result<(), Error> {
        let input = b"\nc generated somewhere\n\np cnf 1 1\nc midway\n1 0\n";
        let domain = fresh_domain();
        let mut reader = DimacsReader::new(&input[..], &domain);

        let clauses: Result<Vec<_>, _> = (&mut reader).collect();
        assert_eq!(clauses?.len(), 1);
        assert_eq!(
            reader.header(),
            Some(Header {
                var_count: 1,
                clause_count: 1,
            })
        );
        Ok(())
    }

    #[test]
    fn empty_input_reads_as_true() -> Result<(), Error> {
        let domain = fresh_domain();
        let formula = read(&b""[..], &domain)?;
        assert_eq!(formula.to_postfix(), "\\T");
        Ok(())
    }

    #[test]
    fn rejects_malformed_input() {
        let domain = fresh_domain();

        let unterminated = read(&b"1 2\n"[..], &domain);
        assert!(matches!(
            unterminated,
            Err(DimacsError::UnterminatedClause { line: 1 })
        ));

        let bad_literal = read(&b"1 x 0\n"[..], &domain);
        assert!(matches!(
            bad_literal,
            Err(DimacsError::InvalidLiteral { line: 1, .. })
        ));

        for header in &["p cnf 1\n", "p notcnf 1 2\n", "p cnf 1 2 3\n", "p cnf a b\n"] {
            let result = read(header.as_bytes(), &domain);
            assert!(matches!(result, Err(DimacsError::InvalidHeader { .. })));
        }

        let twice = read(&b"p cnf 1 1\np cnf 1 1\n1 0\n"[..], &domain);
        assert!(matches!(
            twice,
            Err(DimacsError::InvalidHeader { line: 2, .. })
        ));
    }

    #[test]
    fn frozen_domain_rejects_unknown_numbers() {
        let domain = fresh_domain();
        domain.resolve("a").unwrap();
        domain.freeze();

        let known = read(&b"1 0\n"[..], &domain);
        assert!(known.is_ok());

        let unknown = read(&b"1 2 0\n"[..], &domain);
        assert!(matches!(
            unknown,
            Err(DimacsError::Domain(DomainError::Frozen))
        ));
    }

    #[test]
    fn writes_header_comments_and_clauses() -> Result<(), Error> {
        let domain = fresh_domain();
        let formula = Formula::parse("(a | ~b) & b", &domain)?;

        let mut buf = Vec::new();
        write(
            &mut buf,
            formula.cnf(),
            &domain,
            &["made by boolcalc".to_string()],
        )?;

        assert_eq!(
            String::from_utf8(buf)?,
            "c made by boolcalc\np cnf 2 2\n1 -2 0\n2 0\n"
        );
        Ok(())
    }

    #[test]
    fn empty_clause_round_trips() -> Result<(), Error> {
        let domain = fresh_domain();
        let formula = Formula::parse("\\F", &domain)?;

        let mut buf = Vec::new();
        write(&mut buf, formula.cnf(), &domain, &[])?;
        assert_eq!(String::from_utf8(buf.clone())?, "p cnf 0 1\n0\n");

        let clauses: Result<Vec<_>, _> = DimacsReader::new(&buf[..], &domain).collect();
        let clauses = clauses?;
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].is_empty());
        Ok(())
    }
}
