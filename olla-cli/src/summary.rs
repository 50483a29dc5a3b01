//! Human-readable timing summary printed with `--summary`.

use olla_types::Metrics;

/// Render the summary block shown after a response.
///
/// Durations are printed in seconds with two decimals.
pub fn render(metrics: &Metrics) -> String {
    let mut lines = vec![
        format!(
            "Total Duration: {:.2} seconds",
            Metrics::seconds(metrics.total_duration)
        ),
        format!(
            "Load Duration: {:.2} seconds",
            Metrics::seconds(metrics.load_duration)
        ),
        format!("Prompt Eval Count: {}", metrics.prompt_eval_count),
        format!(
            "Prompt Eval Duration: {:.2} seconds",
            Metrics::seconds(metrics.prompt_eval_duration)
        ),
        format!("Eval Count: {}", metrics.eval_count),
        format!(
            "Eval Duration: {:.2} seconds",
            Metrics::seconds(metrics.eval_duration)
        ),
    ];
    if let Some(rate) = metrics.tokens_per_second() {
        lines.push(format!("Eval Rate: {rate:.2} tokens/s"));
    }

    let mut out = String::from("\n");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_fields() {
        let metrics = Metrics {
            total_duration: 1_500_000_000,
            load_duration: 250_000_000,
            prompt_eval_count: 12,
            prompt_eval_duration: 100_000_000,
            eval_count: 40,
            eval_duration: 1_000_000_000,
        };
        let text = render(&metrics);
        assert!(text.starts_with('\n'));
        assert!(text.contains("Total Duration: 1.50 seconds\n"));
        assert!(text.contains("Load Duration: 0.25 seconds\n"));
        assert!(text.contains("Prompt Eval Count: 12\n"));
        assert!(text.contains("Prompt Eval Duration: 0.10 seconds\n"));
        assert!(text.contains("Eval Count: 40\n"));
        assert!(text.contains("Eval Duration: 1.00 seconds\n"));
        assert!(text.contains("Eval Rate: 40.00 tokens/s\n"));
    }

    #[test]
    fn rate_omitted_without_eval_time() {
        let text = render(&Metrics::default());
        assert!(text.contains("Total Duration: 0.00 seconds"));
        assert!(!text.contains("Eval Rate"));
    }
}
