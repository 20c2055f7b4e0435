//! End-to-end pipeline tests: transport chunks through line splitting,
//! delta extraction and rendering, without any network.

use termchat::providers::{select, PROVIDERS};
use termchat::render::{RenderState, Span, StyledChunk};
use termchat::streaming::LineReader;
use termchat::types::Params;

fn collect(chunks: &[StyledChunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

/// Feed raw transport bytes through the line reader and an adapter's
/// extractor, returning the resulting deltas in arrival order
fn deltas_from_chunks(provider: &str, chunks: &[&[u8]]) -> Vec<String> {
    let adapter = select(provider).unwrap();
    let mut reader = LineReader::new();
    let mut deltas = Vec::new();

    for chunk in chunks {
        for line in reader.push(chunk) {
            let delta = adapter.extract_delta(&line);
            if !delta.is_empty() {
                deltas.push(delta);
            }
        }
    }
    if let Some(line) = reader.finish() {
        let delta = adapter.extract_delta(&line);
        if !delta.is_empty() {
            deltas.push(delta);
        }
    }
    deltas
}

#[test]
fn sse_line_split_across_transport_chunks_yields_ordered_deltas() {
    let deltas = deltas_from_chunks(
        "openai",
        &[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\nda",
            b"ta: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n",
            b"data: [DONE]\n",
        ],
    );
    assert_eq!(deltas, vec!["Hel", "lo"]);
}

#[test]
fn malformed_lines_never_interrupt_the_stream() {
    let deltas = deltas_from_chunks(
        "phind",
        &[
            b"garbage without marker\n",
            b"data: {broken json\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
        ],
    );
    assert_eq!(deltas, vec!["ok"]);
}

#[test]
fn passthrough_family_preserves_every_line() {
    let deltas =
        deltas_from_chunks("blackboxai", &[b"first line\nsecond", b" line\n"]);
    assert_eq!(deltas, vec!["first line\n", "second line\n"]);
}

#[test]
fn rendered_output_matches_for_char_and_delta_granularity() {
    // chunk-boundary insensitivity for prose without backtick runs
    let text = "streaming output should look identical either way.";

    let mut per_delta = RenderState::new(Some(500), false);
    per_delta.push_delta("warmup");
    let a = collect(&per_delta.push_delta(text));

    let mut per_char = RenderState::new(Some(500), false);
    per_char.push_delta("warmup");
    let mut b = String::new();
    for ch in text.chars() {
        b.push_str(&collect(&per_char.push_delta(&ch.to_string())));
    }

    assert_eq!(a, b);
}

#[test]
fn emphasis_span_crosses_extraction_and_render_stages() {
    let deltas = deltas_from_chunks(
        "openai",
        &[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"It is `\"}}]}\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"fast\"}}]}\n",
            b"data: {\"choices\":[{\"delta\":{\"content\":\"`.\"}}]}\n",
        ],
    );

    let mut state = RenderState::new(None, false);
    let mut out = Vec::new();
    for delta in &deltas {
        out.extend(state.push_delta(delta));
    }

    assert_eq!(collect(&out), "It is fast.");
    let emphasized: String = out
        .iter()
        .filter(|c| c.span == Span::Emphasis)
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(emphasized, "fast");
}

#[test]
fn dispatcher_rejects_unknown_names_without_side_effects() {
    assert!(select("definitely-not-a-provider").is_err());
    assert!(!PROVIDERS.contains(&"definitely-not-a-provider"));
}

#[tokio::test]
async fn every_provider_builds_a_request_or_needs_its_handshake() {
    // Stateless adapters must build a request without any network. The
    // handshake family (duckduckgo, kimi) is exercised in its own unit
    // tests with pre-seeded session state.
    let client = reqwest::Client::new();
    let params = Params { system_prompt: "hi".into(), ..Params::default() };

    for name in ["phind", "openai", "deepseek", "groq", "ollama", "pollinations",
        "sky", "koboldai", "blackboxai", "llama2", "isou", "gemini"]
    {
        let mut adapter = select(name).unwrap();
        let request = adapter.build_request(&client, &params, "hello").await;
        assert!(request.is_ok(), "provider {name} failed to build: {:?}", request.err());
        assert_eq!(request.unwrap().method(), "POST");
    }
}
