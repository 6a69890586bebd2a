//! Label resolution.
//!
//! Two passes over normalized lines: build the `label -> line` table, then
//! rewrite every label operand of a control-flow instruction to the literal
//! 1-based line number it names.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::instructions::lookup;
use crate::source::{split_line, LABEL_SUFFIX};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("line {line}: label '{name}' already defined at line {first_line}")]
    DuplicateLabel {
        name: String,
        first_line: usize,
        line: usize,
    },
    #[error("line {line}: label '{name}' was not defined")]
    UndefinedLabel { name: String, line: usize },
    #[error("line {line}: {mnemonic} is missing its label operand")]
    MissingLabelOperand { mnemonic: String, line: usize },
    #[error("line {line}: empty label name")]
    EmptyLabel { line: usize },
}

/// Kind of text handed to the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Input {
    /// Hand-written source: every jump operand names a label.
    #[default]
    Source,
    /// Resolved artifact: numeric operands are already line numbers.
    Artifact,
}

/// Label name to defining line, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelTable {
    labels: BTreeMap<String, usize>,
}

impl LabelTable {
    /// First pass: every line whose first token contains `:` defines a label.
    pub fn build<S: AsRef<str>>(lines: &[S]) -> Result<Self, LinkError> {
        let mut labels = BTreeMap::new();
        for (i, line) in lines.iter().enumerate() {
            let line_no = i + 1;
            let Some(name) = split_line(line.as_ref()).label else {
                continue;
            };
            if name.is_empty() {
                return Err(LinkError::EmptyLabel { line: line_no });
            }
            if let Some(&first_line) = labels.get(name) {
                return Err(LinkError::DuplicateLabel {
                    name: name.to_string(),
                    first_line,
                    line: line_no,
                });
            }
            debug!(label = name, line = line_no, "label defined");
            labels.insert(name.to_string(), line_no);
        }
        Ok(Self { labels })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Name of the label defined on `line`, if any.
    pub fn label_at(&self, line: usize) -> Option<&str> {
        self.labels
            .iter()
            .find(|&(_, &l)| l == line)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Second pass: rewrite label operands. Lines without a label operand are returned verbatim.
///
/// In a source every operand is looked up, so a label may have a numeric
/// name. Only an artifact may carry literal line numbers.
pub fn rewrite<S: AsRef<str>>(
    lines: &[S],
    table: &LabelTable,
    input: Input,
) -> Result<Vec<String>, LinkError> {
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let line_no = i + 1;
        let split = split_line(line);
        let label_operand = split
            .tokens
            .first()
            .and_then(|m| lookup(m))
            .and_then(|d| d.label_operand);
        let Some(pos) = label_operand else {
            out.push(line.to_string());
            continue;
        };

        let mut tokens: Vec<String> = split.tokens.iter().map(|t| t.to_string()).collect();
        let Some(operand) = tokens.get(pos) else {
            return Err(LinkError::MissingLabelOperand {
                mnemonic: tokens[0].clone(),
                line: line_no,
            });
        };
        let resolved = input == Input::Artifact
            && !operand.is_empty()
            && operand.bytes().all(|b| b.is_ascii_digit());
        if !resolved {
            let target = table.get(operand).ok_or_else(|| LinkError::UndefinedLabel {
                name: operand.clone(),
                line: line_no,
            })?;
            tokens[pos] = target.to_string();
        }

        let mut text = String::new();
        if let Some(label) = split.label {
            text.push_str(label);
            text.push(LABEL_SUFFIX);
            text.push(' ');
        }
        text.push_str(&tokens.join(" "));
        if let Some(comment) = split.comment {
            text.push(' ');
            text.push_str(comment);
        }
        out.push(text);
    }
    Ok(out)
}

/// Both passes; returns the table and the resolved lines.
pub fn link<S: AsRef<str>>(
    lines: &[S],
    input: Input,
) -> Result<(LabelTable, Vec<String>), LinkError> {
    let table = LabelTable::build(lines)?;
    let resolved = rewrite(lines, &table, input)?;
    Ok((table, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn forward_reference_resolves_to_later_line() {
        let lines = ["JMP end", "A0: PUT A0 1", "end: PUT A0 2"];
        let (table, out) = link(&lines, Input::Source).unwrap();
        assert_eq!(out, vec!["JMP 3", "A0: PUT A0 1", "end: PUT A0 2"]);
        assert_eq!(table.get("A0"), Some(2));
        assert_eq!(table.label_at(3), Some("end"));
    }

    #[test]
    fn duplicate_label_names_first_line() {
        let lines = ["loop:", "INC A0", "loop: DEC A0"];
        assert_eq!(
            LabelTable::build(&lines),
            Err(LinkError::DuplicateLabel { name: "loop".into(), first_line: 1, line: 3 })
        );
    }

    #[test]
    fn undefined_label() {
        assert_eq!(
            link(&["PUT A0 1", "JMP missing"], Input::Source),
            Err(LinkError::UndefinedLabel { name: "missing".into(), line: 2 })
        );
    }

    #[test]
    fn operand_positions_per_mnemonic() {
        let lines = [
            "top:",
            "JZ A0 top",
            "JNZ A0 top",
            "JLE A0 5 top",
            "JE A0 A1 top",
            "CALL top",
        ];
        let (_, out) = link(&lines, Input::Source).unwrap();
        assert_eq!(
            out,
            vec!["top:", "JZ A0 1", "JNZ A0 1", "JLE A0 5 1", "JE A0 A1 1", "CALL 1"]
        );
    }

    #[test]
    fn labelled_jump_keeps_label_and_comment() {
        let lines = ["again: JNZ B1 again // spin", "INC A0"];
        let (_, out) = link(&lines, Input::Source).unwrap();
        assert_eq!(out[0], "again: JNZ B1 1 // spin");
    }

    #[test]
    fn only_the_operand_token_is_rewritten() {
        // The label shares its name with a register; the register operand must survive.
        let lines = ["A1:", "JE A1 3 A1"];
        let (_, out) = link(&lines, Input::Source).unwrap();
        assert_eq!(out[1], "JE A1 3 1");
    }

    #[test]
    fn missing_operand_and_empty_label() {
        assert_eq!(
            link(&["JZ A0"], Input::Source),
            Err(LinkError::MissingLabelOperand { mnemonic: "JZ".into(), line: 1 })
        );
        assert_eq!(link(&[": INC A0"], Input::Source), Err(LinkError::EmptyLabel { line: 1 }));
    }

    #[test]
    fn numeric_operand_in_source_must_be_a_label() {
        assert_eq!(
            link(&["JMP 5", "INC A0"], Input::Source),
            Err(LinkError::UndefinedLabel { name: "5".into(), line: 1 })
        );
    }

    #[test]
    fn numeric_label_name_is_not_shadowed_by_line_number() {
        let lines = ["3: INC A0", "JZ B0 end", "JMP 3", "end:"];
        let (_, out) = link(&lines, Input::Source).unwrap();
        assert_eq!(out, vec!["3: INC A0", "JZ B0 4", "JMP 1", "end:"]);
    }

    #[test]
    fn artifact_line_numbers_pass_through() {
        // `JMP 1` is the resolved form of `JMP 3` above; the label `3` must not capture it.
        let lines = ["3: INC A0", "JZ B0 4", "JMP 1", "end:"];
        let (_, out) = link(&lines, Input::Artifact).unwrap();
        assert_eq!(out, lines);
        assert_eq!(
            link(&["JMP +1"], Input::Artifact),
            Err(LinkError::UndefinedLabel { name: "+1".into(), line: 1 })
        );
        assert_eq!(
            link(&["JMP gone"], Input::Artifact),
            Err(LinkError::UndefinedLabel { name: "gone".into(), line: 1 })
        );
    }
}
