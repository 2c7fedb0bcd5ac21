//! End-to-end behaviour of the slice node through the public entry points.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sift::prelude::*;
use sift::ROOT_PATH;

fn texts(items: &[&str]) -> Value {
    Value::from(items.to_vec())
}

#[cfg(test)]
mod validate_mode {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_valid_input_yields_empty_map() {
        let schema = slice(int().min(0)).min(1).max(5);
        let mut value = vec![1, 2, 3];
        let issues = validate(&schema, &mut value, []);
        assert!(issues.is_empty());
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn test_min_boundary() {
        let schema = slice(int()).min(3);

        let mut short = vec![1, 2];
        let issues = validate(&schema, &mut short, []);
        assert_eq!(issues.len(), 1);
        let root = issues.get(ROOT_PATH).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].code.as_str(), "min");
        assert_eq!(root[0].param("min"), Some(&Value::from(3)));

        let mut exact = vec![1, 2, 3];
        assert!(validate(&schema, &mut exact, []).is_empty());
    }

    #[test]
    fn test_idempotent_on_valid_value() {
        let schema = slice(string().min(1)).len(2);
        let mut value = vec!["a".to_string(), "b".to_string()];
        let first = validate(&schema, &mut value, []);
        let second = validate(&schema, &mut value, []);
        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(value, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_nested_slice_path() {
        let schema = slice(slice(int().max(9)));
        let mut value = vec![vec![1], vec![2, 3, 42], vec![]];
        let issues = validate(&schema, &mut value, []);
        assert_eq!(issues.paths().collect::<Vec<_>>(), vec!["[1][2]"]);
        assert_eq!(issues.get("[1][2]").unwrap()[0].code, IssueCode::Max);
    }

    #[test]
    fn test_contains() {
        let schema = slice(int()).contains(5);

        let mut with_five = vec![1, 5, 9];
        assert!(validate(&schema, &mut with_five, []).is_empty());

        let mut without = vec![1, 2, 9];
        let issues = validate(&schema, &mut without, []);
        let issue = &issues.root().unwrap()[0];
        assert_eq!(issue.code, IssueCode::Contains);
        assert_eq!(issue.param("contains"), Some(&Value::from(5)));
        assert_eq!(issue.message, "should contain 5");
    }

    #[test]
    fn test_len() {
        let schema = slice(int()).len(3);
        for mut value in [vec![1, 2], vec![1, 2, 3, 4]] {
            let issues = validate(&schema, &mut value, []);
            let issue = &issues.root().unwrap()[0];
            assert_eq!(issue.code, IssueCode::Len);
            assert_eq!(issue.param("len"), Some(&Value::from(3)));
        }
        let mut exact = vec![7, 8, 9];
        assert!(validate(&schema, &mut exact, []).is_empty());
    }

    #[test]
    fn test_pre_transform_failure_short_circuits() {
        let visited = Arc::new(AtomicUsize::new(0));
        let post_runs = Arc::new(AtomicUsize::new(0));

        let element_visits = visited.clone();
        let post = post_runs.clone();
        let schema = slice(int().test_func(move |_, _| {
            element_visits.fetch_add(1, Ordering::SeqCst);
            true
        }))
        .pre_transform(|_, _| Err(anyhow::anyhow!("unreadable")))
        .post_transform(move |_, _| {
            post.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let mut value = vec![1, 2, 3];
        let issues = validate(&schema, &mut value, []);

        assert_eq!(visited.load(Ordering::SeqCst), 0);
        assert_eq!(post_runs.load(Ordering::SeqCst), 0);
        assert_eq!(issues.len(), 1);
        let root = issues.root().unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].code, IssueCode::Unknown);
        assert_eq!(root[0].message, "unreadable");
    }

    #[test]
    fn test_optional_absent_skips_recursion() {
        let visited = Arc::new(AtomicUsize::new(0));
        let counter = visited.clone();
        let schema = slice(int())
            .min(2)
            .test_func(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            });

        let mut empty: Vec<i64> = Vec::new();
        assert!(validate(&schema, &mut empty, []).is_empty());

        let mut dest: Vec<i64> = Vec::new();
        assert!(process(&schema, &Value::Null, &mut dest, []).is_empty());
        assert!(process(&schema, &texts(&[]), &mut dest, []).is_empty());
        assert_eq!(visited.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_required_then_optional_last_call_wins() {
        let schema = slice(int()).required().optional();
        let mut empty: Vec<i64> = Vec::new();
        assert!(validate(&schema, &mut empty, []).is_empty());

        let schema = slice(int()).optional().required();
        let issues = validate(&schema, &mut empty, []);
        assert_eq!(issues.root().unwrap()[0].code, IssueCode::Required);
        assert_eq!(issues.root().unwrap()[0].message, "is required");
    }

    #[test]
    fn test_default_replaces_zero_value() {
        let schema = slice(int()).default(vec![4, 2]);
        let mut value = Vec::new();
        assert!(validate(&schema, &mut value, []).is_empty());
        assert_eq!(value, vec![4, 2]);
    }

    #[test]
    fn test_pre_transform_rewrites_value() {
        let schema = slice(int().min(0)).pre_transform(|v: &Vec<i64>, _| {
            Ok(v.iter().map(|n| n.abs()).collect())
        });
        let mut value = vec![-1, 2, -3];
        assert!(validate(&schema, &mut value, []).is_empty());
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn test_raw_pre_transform_is_reported() {
        let schema = slice(int().min(0)).pre_transform_raw(|input, _| Ok(input.clone()));
        let mut value = vec![-1];
        let issues = validate(&schema, &mut value, []);
        let root = issues.root().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].code, IssueCode::Unknown);
        assert_eq!(
            root[0].message,
            "process-mode pre-transform cannot run in validate mode"
        );
    }
}

#[cfg(test)]
mod process_mode {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_numeric_strings_become_ints() {
        let schema = slice(int());
        let mut dest: Vec<i64> = Vec::new();
        let issues = process(&schema, &texts(&["1", "2", "3"]), &mut dest, []);
        assert!(issues.is_empty());
        assert_eq!(dest, vec![1, 2, 3]);
    }

    #[test]
    fn test_tests_see_coerced_destination() {
        let schema = slice(int()).contains(2);
        let mut dest = Vec::new();
        assert!(process(&schema, &texts(&["1", "2"]), &mut dest, []).is_empty());
    }

    #[test]
    fn test_required_checks_source() {
        let schema = slice(int()).required();
        let mut dest = vec![1];
        let issues = process(&schema, &texts(&[]), &mut dest, []);
        assert_eq!(issues.root().unwrap()[0].code, IssueCode::Required);
    }

    #[test]
    fn test_coerce_failure_stops_node() {
        let schema = slice(int()).min(3);
        let mut dest = Vec::new();
        let input = Value::from(sift::Map::from([("a".to_string(), Value::from(1))]));
        let issues = process(&schema, &input, &mut dest, []);
        let root = issues.root().unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].code, IssueCode::Coerce);
        assert_eq!(root[0].message, "should be a valid slice");
    }

    #[test]
    fn test_default_is_checked_like_validate() {
        let schema = slice(int().min(0)).default(vec![-1, 5]);
        let mut dest = Vec::new();
        let issues = process(&schema, &Value::Null, &mut dest, []);
        assert_eq!(dest, vec![-1, 5]);
        assert_eq!(issues.paths().collect::<Vec<_>>(), vec!["[0]"]);
    }

    #[test]
    fn test_raw_pre_transform_splits_text() {
        let schema = slice(int()).pre_transform_raw(|input, _| {
            Ok(match input.as_str() {
                Some(text) => text.split(',').collect(),
                None => input.clone(),
            })
        });
        let mut dest = Vec::new();
        assert!(process(&schema, &Value::from("4,5,6"), &mut dest, []).is_empty());
        assert_eq!(dest, vec![4, 5, 6]);
    }

    #[test]
    fn test_issue_order_within_call() {
        let schema = slice(int()).len(4).contains(9);
        let mut dest = Vec::new();
        let issues = process(&schema, &texts(&["1", "x", "3"]), &mut dest, []);
        assert_eq!(issues.paths().collect::<Vec<_>>(), vec!["[1]", "$root"]);
        let root: Vec<_> = issues.root().unwrap().iter().map(|i| i.code.clone()).collect();
        assert_eq!(root, vec![IssueCode::Len, IssueCode::Contains]);
    }

    fn counted(
        visited: &Arc<AtomicUsize>,
        post_runs: &Arc<AtomicUsize>,
    ) -> sift::Slice<sift::Primitive<i64>> {
        let element_visits = visited.clone();
        let post = post_runs.clone();
        slice(int().test_func(move |_, _| {
            element_visits.fetch_add(1, Ordering::SeqCst);
            true
        }))
        .post_transform(move |_, _| {
            post.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_raw_pre_transform_failure_short_circuits() {
        let visited = Arc::new(AtomicUsize::new(0));
        let post_runs = Arc::new(AtomicUsize::new(0));
        let schema = counted(&visited, &post_runs)
            .pre_transform_raw(|_, _| Err(anyhow::anyhow!("unreadable")));

        let mut dest = Vec::new();
        let issues = process(&schema, &texts(&["1", "2"]), &mut dest, []);

        assert_eq!(visited.load(Ordering::SeqCst), 0);
        assert_eq!(post_runs.load(Ordering::SeqCst), 0);
        assert_eq!(issues.len(), 1);
        let root = issues.root().unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].code, IssueCode::Unknown);
        assert_eq!(root[0].message, "unreadable");
        assert!(dest.is_empty());
    }

    #[test]
    fn test_typed_pre_transform_is_reported() {
        let visited = Arc::new(AtomicUsize::new(0));
        let post_runs = Arc::new(AtomicUsize::new(0));
        let schema = counted(&visited, &post_runs).pre_transform(|v: &Vec<i64>, _| Ok(v.clone()));

        let mut dest = Vec::new();
        let issues = process(&schema, &texts(&["1", "2"]), &mut dest, []);

        assert_eq!(visited.load(Ordering::SeqCst), 0);
        assert_eq!(post_runs.load(Ordering::SeqCst), 0);
        let root = issues.root().unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].code, IssueCode::Unknown);
        assert_eq!(
            root[0].message,
            "validate-mode pre-transform cannot run in process mode"
        );
    }

    #[test]
    fn test_coerce_failure_skips_post_transforms() {
        let visited = Arc::new(AtomicUsize::new(0));
        let post_runs = Arc::new(AtomicUsize::new(0));
        let schema = counted(&visited, &post_runs);

        let mut dest = Vec::new();
        let input = Value::from(sift::Map::from([("a".to_string(), Value::from(1))]));
        let issues = process(&schema, &input, &mut dest, []);

        assert_eq!(visited.load(Ordering::SeqCst), 0);
        assert_eq!(post_runs.load(Ordering::SeqCst), 0);
        assert_eq!(issues.root().unwrap()[0].code, IssueCode::Coerce);

        assert!(process(&schema, &texts(&["1"]), &mut dest, []).is_empty());
        assert_eq!(visited.load(Ordering::SeqCst), 1);
        assert_eq!(post_runs.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod post_transforms {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_runs_on_success() {
        let schema = slice(int()).post_transform(|v: &mut Vec<i64>, _| {
            v.sort_unstable();
            Ok(())
        });
        let mut dest = Vec::new();
        assert!(process(&schema, &texts(&["3", "1", "2"]), &mut dest, []).is_empty());
        assert_eq!(dest, vec![1, 2, 3]);
    }

    #[test]
    fn test_skipped_when_any_descendant_failed() {
        let schema = slice(int().max(5)).post_transform(|v: &mut Vec<i64>, _| {
            v.clear();
            Ok(())
        });
        let mut value = vec![1, 10];
        let issues = validate(&schema, &mut value, []);
        assert_eq!(issues.paths().collect::<Vec<_>>(), vec!["[1]"]);
        assert_eq!(value, vec![1, 10]);
    }

    #[test]
    fn test_failure_is_recorded() {
        let schema =
            slice(int()).post_transform(|_, _| Err(anyhow::anyhow!("could not finalize")));
        let mut value = vec![1];
        let issues = validate(&schema, &mut value, []);
        assert_eq!(issues.root().unwrap()[0].code, IssueCode::Unknown);
    }
}

#[cfg(test)]
mod options {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_ctx_value_visible_to_tests() {
        let schema = slice(int()).test_func(|v, ctx| {
            ctx.get::<usize>("limit").is_some_and(|limit| v.len() <= *limit)
        });
        let mut value = vec![1, 2, 3];
        assert!(validate(&schema, &mut value, [with_ctx_value("limit", 3_usize)]).is_empty());
        assert_eq!(
            validate(&schema, &mut value, [with_ctx_value("limit", 2_usize)]).len(),
            1
        );
        // Missing value: the test decides.
        assert_eq!(validate(&schema, &mut value, []).len(), 1);
    }

    #[test]
    fn test_formatter_override() {
        let schema = slice(int()).min(2);
        let mut value = vec![1];
        let issues = validate(
            &schema,
            &mut value,
            [with_formatter(|issue, _| {
                issue.message = format!("{} failed at {}", issue.code, issue.path);
            })],
        );
        assert_eq!(issues.root().unwrap()[0].message, "min failed at $root");
    }

    #[test]
    fn test_per_test_message_beats_formatter() {
        let schema = slice(int()).test(
            Test::new(IssueCode::Custom("even_len".to_string()), |v: &Vec<i64>, _| {
                v.len() % 2 == 0
            })
            .message("needs pairs"),
        );
        let mut value = vec![1];
        let issues = validate(
            &schema,
            &mut value,
            [with_formatter(|issue, _| issue.message = "generic".to_string())],
        );
        let issue = &issues.root().unwrap()[0];
        assert_eq!(issue.code.as_str(), "even_len");
        assert_eq!(issue.message, "needs pairs");
    }

    #[test]
    fn test_required_custom_message() {
        let schema = slice(int()).required_with(Required::new().message("list please"));
        let mut value = Vec::new();
        let issues = validate(&schema, &mut value, []);
        assert_eq!(issues.sanitize()[ROOT_PATH], vec!["list please".to_string()]);
    }

    #[test]
    fn test_custom_coercer() {
        let schema = slice(int()).with_coercer(|input| match input {
            Value::Text(text) => Ok(std::borrow::Cow::Owned(
                text.split_whitespace().map(Value::from).collect(),
            )),
            other => sift::Coercers::slice(other),
        });
        let mut dest = Vec::new();
        assert!(process(&schema, &Value::from("7 8"), &mut dest, []).is_empty());
        assert_eq!(dest, vec![7, 8]);
    }
}

#[cfg(test)]
mod reuse {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_state_leaks_between_calls() {
        let schema = slice(int()).min(2);
        let mut bad = vec![1];
        assert_eq!(validate(&schema, &mut bad, [with_ctx_value("k", 1_u8)]).len(), 1);

        let observed = Arc::new(AtomicUsize::new(0));
        let seen = observed.clone();
        let inspect = slice(int()).test_func(move |_, ctx| {
            if ctx.get::<u8>("k").is_some() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
            ctx.path() == ROOT_PATH
        });
        let mut good = vec![1, 2];
        assert!(validate(&inspect, &mut good, []).is_empty());
        assert!(validate(&schema, &mut good, []).is_empty());
        assert_eq!(observed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schema_shared_across_threads() {
        let schema = Arc::new(slice(int().max(100)).min(1));
        std::thread::scope(|scope| {
            for n in 0..4_i64 {
                let schema = schema.clone();
                scope.spawn(move || {
                    let mut value = vec![n, n * 50];
                    let issues = validate(&*schema, &mut value, []);
                    assert_eq!(issues.is_empty(), n * 50 <= 100);
                });
            }
        });
    }

    #[test]
    fn test_with_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
        let schema = slice(int()).required();
        let mut dest = Vec::new();
        let issues = process(&schema, &Value::Null, &mut dest, []);
        assert_eq!(issues.len(), 1);
    }
}
