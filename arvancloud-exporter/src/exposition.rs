//! Prometheus text exposition format (version 0.0.4).

use std::collections::HashMap;
use std::fmt::Write;

use crate::metrics::Sample;

/// Content type of the rendered output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render the samples of one collection pass.
///
/// Samples are grouped into families by metric name so that each family's
/// `# HELP` and `# TYPE` lines appear once, followed by all of its samples.
/// Families are written in the order their first sample was emitted.
pub fn render(samples: &[Sample]) -> String {
    let mut families: Vec<Vec<&Sample>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples {
        let name = sample.desc().fq_name();
        match index.get(name).copied() {
            Some(i) => families[i].push(sample),
            None => {
                index.insert(name, families.len());
                families.push(vec![sample]);
            }
        }
    }

    let mut output = String::with_capacity(samples.len() * 100);

    for family in families {
        let first = family[0];
        let desc = first.desc();

        writeln!(output, "# HELP {} {}", desc.fq_name(), escape_help(desc.help())).ok();
        writeln!(
            output,
            "# TYPE {} {}",
            desc.fq_name(),
            first.value_type().as_str()
        )
        .ok();

        for sample in family {
            writeln!(
                output,
                "{}{} {}",
                desc.fq_name(),
                format_labels(sample),
                format_value(sample.value())
            )
            .ok();
        }
    }

    output
}

/// Escape special characters in help text.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Format a sample's labels, or an empty string when it has none.
fn format_labels(sample: &Sample) -> String {
    let parts: Vec<String> = sample
        .labels()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    format!("{{{}}}", parts.join(","))
}
