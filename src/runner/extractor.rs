//! Recovering the best fitness from solver output.
//!
//! Extraction never fails: anything that does not yield a fitness becomes
//! [`ExtractOutcome::NoData`] or [`ExtractOutcome::Malformed`], and the
//! trial is recorded with an unknown fitness.

use std::fs;
use std::io;
use std::path::Path;

use crate::schema::ExtractionSource;

/// Marker on the last report line, followed by the fitness.
const REPORT_MARKER: &str = "fitness: ";

/// Stdout lines carrying progress contain this phrase (case-insensitive).
const PROGRESS_PHRASE: &str = "melhor fitness";

/// Result of scanning solver output for a fitness value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A fitness was recovered.
    Found {
        fitness: u32,
        generation: Option<u32>,
    },
    /// Nothing to parse: missing or empty report, or no progress line.
    NoData,
    /// Output looked like a result but could not be parsed.
    Malformed(String),
}

impl ExtractOutcome {
    pub fn fitness(&self) -> Option<u32> {
        match self {
            ExtractOutcome::Found { fitness, .. } => Some(*fitness),
            _ => None,
        }
    }

    pub fn generation(&self) -> Option<u32> {
        match self {
            ExtractOutcome::Found { generation, .. } => *generation,
            _ => None,
        }
    }

    /// Fitness exactly zero.
    pub fn is_success(&self) -> bool {
        self.fitness() == Some(0)
    }

    /// Short description of why no fitness is available.
    pub fn reason(&self) -> Option<String> {
        match self {
            ExtractOutcome::Found { .. } => None,
            ExtractOutcome::NoData => Some("no fitness reported".to_string()),
            ExtractOutcome::Malformed(msg) => Some(format!("malformed output: {}", msg)),
        }
    }
}

/// Extract from whichever source is configured.
pub fn extract(source: ExtractionSource, stdout: &str, report_path: &Path) -> ExtractOutcome {
    match source {
        ExtractionSource::ReportFile => from_report_file(report_path),
        ExtractionSource::Stdout => from_stdout(stdout),
    }
}

/// Read the solver's report file and parse its last line.
pub fn from_report_file(path: &Path) -> ExtractOutcome {
    match fs::read(path) {
        Ok(bytes) => from_report_text(&String::from_utf8_lossy(&bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => ExtractOutcome::NoData,
        Err(e) => ExtractOutcome::Malformed(format!("cannot read {}: {}", path.display(), e)),
    }
}

/// Parse report text: the last line must read `... fitness: <int>`.
pub fn from_report_text(text: &str) -> ExtractOutcome {
    let Some(last) = text.lines().last() else {
        return ExtractOutcome::NoData;
    };

    let Some(value) = last.split(REPORT_MARKER).nth(1) else {
        return ExtractOutcome::Malformed(format!(
            "last line lacks '{}': {:?}",
            REPORT_MARKER, last
        ));
    };

    match value.trim().parse::<u32>() {
        Ok(fitness) => ExtractOutcome::Found {
            fitness,
            generation: None,
        },
        Err(_) => ExtractOutcome::Malformed(format!("invalid fitness {:?}", value.trim())),
    }
}

/// Scan stdout progress lines such as `Iteracao 42, melhor fitness: 3`.
///
/// Every matching line overwrites the previous values, so the result is the
/// last reported line, not the lowest fitness seen.
pub fn from_stdout(text: &str) -> ExtractOutcome {
    let mut fitness = None;
    let mut generation = None;
    let mut matched = false;
    let mut last_error = None;

    for line in text.lines() {
        if !line.to_lowercase().contains(PROGRESS_PHRASE) {
            continue;
        }
        matched = true;
        if let Err(e) = scan_progress_line(line, &mut fitness, &mut generation) {
            last_error = Some(e);
        }
    }

    match fitness {
        Some(fitness) => ExtractOutcome::Found {
            fitness,
            generation,
        },
        None if matched => ExtractOutcome::Malformed(
            last_error.unwrap_or_else(|| "progress line without fitness".to_string()),
        ),
        None => ExtractOutcome::NoData,
    }
}

/// Update `fitness`/`generation` from one line's comma-separated segments.
///
/// A parse failure stops at the failing segment; values taken from earlier
/// segments of the same line are kept.
fn scan_progress_line(
    line: &str,
    fitness: &mut Option<u32>,
    generation: &mut Option<u32>,
) -> Result<(), String> {
    for segment in line.split(',') {
        let lower = segment.to_lowercase();
        if lower.contains("iteracao") {
            *generation = Some(parse_digits(segment)?);
        }
        if lower.contains("fitness") {
            let tail = segment.rsplit("fitness").next().unwrap_or(segment);
            *fitness = Some(parse_digits(tail)?);
        }
    }
    Ok(())
}

/// Concatenate every ASCII digit in `text` and parse the result.
fn parse_digits(text: &str) -> Result<u32, String> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse()
        .map_err(|_| format!("no number in {:?}", text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_report_last_line_success() {
        let text = "Geração 1, melhor fitness: 14\n\
                    Geração 5, melhor fitness: 3\n\
                    Geração 12, melhor fitness: 0\n";
        let outcome = from_report_text(text);
        assert_eq!(outcome.fitness(), Some(0));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_report_nonzero() {
        let outcome = from_report_text("Geração 300, melhor fitness: 4  \n");
        assert_eq!(outcome.fitness(), Some(4));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_report_file_absent() {
        let dir = tempdir().unwrap();
        let outcome = from_report_file(&dir.path().join("relatorio.txt"));
        assert_eq!(outcome, ExtractOutcome::NoData);
        assert_eq!(outcome.fitness(), None);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_report_file_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relatorio.txt");
        fs::write(&path, "").unwrap();
        assert_eq!(from_report_file(&path), ExtractOutcome::NoData);
    }

    #[test]
    fn test_report_file_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relatorio.txt");
        fs::write(&path, "Geração 7, melhor fitness: 2\n").unwrap();
        assert_eq!(from_report_file(&path).fitness(), Some(2));
    }

    #[test]
    fn test_report_missing_marker_is_malformed() {
        let outcome = from_report_text("Geração 12, melhor fitness: 0\nfim da execução\n");
        assert!(matches!(outcome, ExtractOutcome::Malformed(_)));
        assert!(outcome.reason().unwrap().starts_with("malformed"));
    }

    #[test]
    fn test_report_bad_number_is_malformed() {
        let outcome = from_report_text("melhor fitness: -\n");
        assert!(matches!(outcome, ExtractOutcome::Malformed(_)));
    }

    #[test]
    fn test_report_takes_text_up_to_second_marker() {
        assert_eq!(from_report_text("fitness: 5 fitness: 9").fitness(), Some(5));
        assert_eq!(from_report_text("a fitness: 5").fitness(), Some(5));
    }

    #[test]
    fn test_stdout_last_line_wins() {
        let stdout = "\
Carregando entrada.in
Iteracao 10, melhor fitness: 2
Iteracao 20, melhor fitness: 5
Fim
";
        assert_eq!(
            from_stdout(stdout),
            ExtractOutcome::Found {
                fitness: 5,
                generation: Some(20)
            }
        );
    }

    #[test]
    fn test_stdout_case_insensitive() {
        let outcome = from_stdout("ITERACAO 7, MELHOR FITNESS: 0");
        // Uppercase FITNESS is not a split point, so every digit in the segment counts.
        assert_eq!(outcome.fitness(), Some(0));
        assert_eq!(outcome.generation(), Some(7));
    }

    #[test]
    fn test_stdout_digits_after_last_fitness_word() {
        let outcome = from_stdout("Iteracao 3, melhor fitness (fitness 2): 11");
        assert_eq!(outcome.fitness(), Some(211));
    }

    #[test]
    fn test_stdout_no_progress_lines() {
        assert_eq!(from_stdout("hello\nworld\n"), ExtractOutcome::NoData);
        assert_eq!(from_stdout(""), ExtractOutcome::NoData);
    }

    #[test]
    fn test_stdout_unparsable_line_keeps_previous() {
        let stdout = "Iteracao 4, melhor fitness: 6\nIteracao ?, melhor fitness: 1\n";
        // The second line fails on its generation segment before reaching fitness.
        assert_eq!(
            from_stdout(stdout),
            ExtractOutcome::Found {
                fitness: 6,
                generation: Some(4)
            }
        );
    }

    #[test]
    fn test_stdout_only_unparsable_is_malformed() {
        let outcome = from_stdout("melhor fitness: desconhecido");
        assert!(matches!(outcome, ExtractOutcome::Malformed(_)));
    }

    #[test]
    fn test_extract_dispatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("relatorio.txt");
        fs::write(&path, "Geração 2, melhor fitness: 1\n").unwrap();
        let stdout = "Iteracao 2, melhor fitness: 0";

        assert_eq!(extract(ExtractionSource::ReportFile, stdout, &path).fitness(), Some(1));
        assert_eq!(extract(ExtractionSource::Stdout, stdout, &path).fitness(), Some(0));
    }
}
