use querysnap_core::{CaptureCollection, CaptureSet, QueryCapture};
use querysnap_report::{BufferSink, Reporter};
use serde_json::{Value, json};

fn aggregation_set(results: Vec<Value>) -> CaptureCollection {
    CaptureCollection::new(CaptureSet::new(
        "coll",
        vec![QueryCapture::Aggregation {
            pipeline: vec![json!({"$match": {"a": 1}})],
            results,
            explain: json!({
                "queryPlanner": {"winningPlan": {"stage": "COLLSCAN"}},
                "executionStats": {"nReturned": 2, "executionTimeMillis": 7}
            }),
        }],
    ))
}

fn render_aggregation(coll: &CaptureCollection, sort: bool) -> String {
    let mut reporter = Reporter::new(BufferSink::new());
    reporter
        .render_aggregation(coll, &[json!({"$match": {"a": 1}})], sort)
        .expect("render aggregation");
    reporter.into_sink().contents()
}

#[test]
fn aggregation_render_is_deterministic() {
    let coll = aggregation_set(vec![json!({"a": 1, "b": 2}), json!({"a": 1, "b": 1})]);
    assert_eq!(render_aggregation(&coll, true), render_aggregation(&coll, true));
}

#[test]
fn sorted_results_are_independent_of_storage_order() {
    let forward = aggregation_set(vec![json!({"a": 1, "b": 2}), json!({"a": 1, "b": 1})]);
    let reversed = aggregation_set(vec![json!({"a": 1, "b": 1}), json!({"a": 1, "b": 2})]);
    let text = render_aggregation(&forward, true);
    assert_eq!(text, render_aggregation(&reversed, true));

    let first = text.find("\"b\": 1").expect("doc with b=1");
    let second = text.find("\"b\": 2").expect("doc with b=2");
    assert!(first < second, "docs must render in canonical order");
}

#[test]
fn unsorted_results_keep_engine_order() {
    let coll = aggregation_set(vec![json!({"a": 1, "b": 2}), json!({"a": 1, "b": 1})]);
    let text = render_aggregation(&coll, false);
    let first = text.find("\"b\": 2").expect("doc with b=2");
    let second = text.find("\"b\": 1").expect("doc with b=1");
    assert!(first < second, "engine order must be preserved");
}

#[test]
fn aggregation_sections_render_in_fixed_order_with_scrubbed_explain() {
    let coll = aggregation_set(vec![json!({"a": 1, "b": 2}), json!({"a": 1, "b": 1})]);
    let text = render_aggregation(&coll, true);
    let expected = "\
### Pipeline
```json
[
  {
    \"$match\": {
      \"a\": 1
    }
  }
]
```
### Results
```json
[
  {
    \"a\": 1,
    \"b\": 1
  },
  {
    \"a\": 1,
    \"b\": 2
  }
]
```
### Summarized explain
```json
{
  \"executionStats\": {
    \"nReturned\": 2
  },
  \"queryPlanner\": {
    \"winningPlan\": {
      \"stage\": \"COLLSCAN\"
    }
  }
}
```

";
    assert_eq!(text, expected);
}

fn distinct_collection(matching_docs: Vec<Value>, values: Vec<Value>) -> CaptureCollection {
    CaptureCollection::new(CaptureSet::new(
        "coll",
        vec![QueryCapture::Distinct {
            key: "a".to_string(),
            filter: json!({}),
            values,
            matching_docs,
            explain: json!({"queryPlanner": {"winningPlan": {"stage": "DISTINCT_SCAN"}}}),
        }],
    ))
}

fn render_distinct(coll: &CaptureCollection) -> String {
    let mut reporter = Reporter::new(BufferSink::new());
    reporter
        .render_distinct(coll, "a", &json!({}))
        .expect("render distinct");
    reporter.into_sink().contents()
}

#[test]
fn expected_results_are_deduplicated_and_sorted() {
    // Expected set comes from the scan, no matter what the engine returned.
    let coll = distinct_collection(
        vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 1})],
        vec![json!(2), json!(2), json!(1)],
    );
    let text = render_distinct(&coll);
    assert!(
        text.contains("### Expected results\n`[1,2]`\n"),
        "expected set must dedupe and sort, got:\n{text}"
    );
    assert!(
        text.contains("### Distinct results\n`[2,2,1]`\n"),
        "engine answer must render verbatim, got:\n{text}"
    );
}

#[test]
fn missing_and_null_values_collapse_to_the_null_marker() {
    let coll = distinct_collection(
        vec![json!({"a": 1}), json!({"a": null}), json!({"a": 1})],
        vec![json!(1), json!(null)],
    );
    let text = render_distinct(&coll);
    assert!(
        text.contains("### Expected results\n`[1,null]`\n"),
        "null marker must sort after 1, got:\n{text}"
    );
}

#[test]
fn distinct_subsections_render_in_fixed_order() {
    let coll = distinct_collection(vec![json!({"a": 1})], vec![json!(1)]);
    let text = render_distinct(&coll);
    let expected = "\
### Distinct on \"a\", with filter: {}
### Expected results
`[1]`
### Distinct results
`[1]`
### Summarized explain
```json
{
  \"queryPlanner\": {
    \"winningPlan\": {
      \"stage\": \"DISTINCT_SCAN\"
    }
  }
}
```

";
    assert_eq!(text, expected);
}

#[test]
fn expected_and_distinct_agree_on_well_behaved_engines() {
    // Regression oracle: when the engine distinct is correct and pre-sorted,
    // the two subsections render the same value.
    let coll = distinct_collection(
        vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 1})],
        vec![json!(1), json!(2)],
    );
    let text = render_distinct(&coll);
    assert!(text.contains("### Expected results\n`[1,2]`\n"));
    assert!(text.contains("### Distinct results\n`[1,2]`\n"));
}

#[test]
fn section_numbers_increase_across_renders() {
    let coll = aggregation_set(vec![json!({"a": 1, "b": 2})]);
    let mut reporter = Reporter::new(BufferSink::new());
    for title in ["match on a", "match on a again", "third pass"] {
        reporter.section(title).expect("section");
        reporter
            .render_aggregation(&coll, &[json!({"$match": {"a": 1}})], true)
            .expect("render");
    }
    let text = reporter.into_sink().contents();
    assert!(text.contains("## 1. match on a\n"));
    assert!(text.contains("## 2. match on a again\n"));
    assert!(text.contains("## 3. third pass\n"));
    assert!(!text.contains("## 4."));
}

#[test]
fn collaborator_failures_propagate_unchanged() {
    let coll = aggregation_set(vec![json!({"a": 1})]);
    let mut reporter = Reporter::new(BufferSink::new());
    let err = reporter
        .render_aggregation(&coll, &[json!({"$match": {"b": 9}})], true)
        .expect_err("pipeline was never captured");
    assert!(
        matches!(err, querysnap_core::Error::InvalidCapture(_)),
        "got {err:?}"
    );
    // Nothing was emitted for the failed render.
    assert!(reporter.into_sink().contents().is_empty());
}
