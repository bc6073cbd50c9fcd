/// Integration tests for the Judge0 HTTP client
///
/// A throwaway axum server stands in for Judge0 so the wire format, auth header
/// and polling loop are exercised over real HTTP. Tests against a live Judge0
/// are ignored by default.

#[cfg(test)]
mod judge0_client_tests {
    use crate::config::JudgeConfig;
    use crate::error::ExecutionError;
    use crate::judge0::{status, submit_and_wait, ExecutionService, Judge0Client, PollPolicy, Submission};
    use crate::parser::format_result_block;
    use crate::templates::TemplateRegistry;
    use crate::tester::{AutomatedTestConfig, AutomatedTester};
    use crate::types::{OverallStatus, TestCase, TestResult, TestStatus};
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct MockJudge0 {
        pending_polls: u32,
        stdout: String,
        polls: AtomicU32,
        auth: Mutex<Vec<Option<String>>>,
        bodies: Mutex<Vec<Value>>,
        queries: Mutex<Vec<HashMap<String, String>>>,
    }

    async fn create_submission(
        State(mock): State<Arc<MockJudge0>>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        mock.auth.lock().unwrap().push(
            headers
                .get("x-auth-token")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        );
        mock.queries.lock().unwrap().push(query);

        if body["language_id"] == json!(0) {
            mock.bodies.lock().unwrap().push(body);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"language_id": ["language with id 0 doesn't exist"]})),
            );
        }

        mock.bodies.lock().unwrap().push(body);
        (StatusCode::CREATED, Json(json!({"token": "mock-token"})))
    }

    async fn show_submission(
        State(mock): State<Arc<MockJudge0>>,
        Path(token): Path<String>,
    ) -> (StatusCode, Json<Value>) {
        if token != "mock-token" {
            return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})));
        }

        let poll = mock.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if poll <= mock.pending_polls {
            return (
                StatusCode::OK,
                Json(json!({
                    "stdout": null, "stderr": null, "compile_output": null, "message": null,
                    "time": null, "memory": null,
                    "status": {"id": status::PROCESSING, "description": "Processing"}
                })),
            );
        }

        (
            StatusCode::OK,
            Json(json!({
                "stdout": mock.stdout, "stderr": null, "compile_output": null, "message": null,
                "time": "0.031", "memory": 9876, "exit_code": 0,
                "status": {"id": status::ACCEPTED, "description": "Accepted"}
            })),
        )
    }

    async fn spawn_mock(mock: Arc<MockJudge0>) -> String {
        let app = Router::new()
            .route("/submissions", post(create_submission))
            .route("/submissions/:token", get(show_submission))
            .with_state(mock);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(5),
            max_attempts: 10,
        }
    }

    #[tokio::test]
    async fn test_submit_and_poll_over_http() {
        let mock = Arc::new(MockJudge0 {
            pending_polls: 2,
            stdout: "hello\n".to_string(),
            ..Default::default()
        });
        let base_url = spawn_mock(mock.clone()).await;
        let client = Judge0Client::new(format!("{}/", base_url)).with_auth("X-Auth-Token", "s3cret");

        let mut submission = Submission::new("print('hello')", 71);
        submission.cpu_time_limit = Some(2.0);
        let result = submit_and_wait(&client, &submission, &fast_policy()).await.unwrap();

        assert_eq!(result.status.id, status::ACCEPTED);
        assert_eq!(result.stdout.as_deref(), Some("hello\n"));
        assert_eq!(result.memory, Some(9876));
        assert!((result.time_ms() - 31.0).abs() < 1e-9);
        assert_eq!(mock.polls.load(Ordering::SeqCst), 3);

        assert_eq!(mock.auth.lock().unwrap()[0].as_deref(), Some("s3cret"));
        let query = &mock.queries.lock().unwrap()[0];
        assert_eq!(query.get("base64_encoded").map(String::as_str), Some("false"));
        assert_eq!(query.get("wait").map(String::as_str), Some("false"));
        let body = &mock.bodies.lock().unwrap()[0];
        assert_eq!(body["source_code"], json!("print('hello')"));
        assert_eq!(body["language_id"], json!(71));
        assert_eq!(body["cpu_time_limit"], json!(2.0));
        assert!(body.get("stdin").is_none());
    }

    #[tokio::test]
    async fn test_no_auth_header_without_token() {
        let mock = Arc::new(MockJudge0::default());
        let base_url = spawn_mock(mock.clone()).await;

        let config = JudgeConfig {
            api_url: base_url,
            ..JudgeConfig::default()
        };
        let client = Judge0Client::from_config(&config);
        client.submit(&Submission::new("x", 63)).await.unwrap();

        assert_eq!(mock.auth.lock().unwrap()[0], None);
    }

    #[tokio::test]
    async fn test_rejected_submission_surfaces_status() {
        let mock = Arc::new(MockJudge0::default());
        let base_url = spawn_mock(mock).await;
        let client = Judge0Client::new(base_url);

        let err = client.submit(&Submission::new("x", 0)).await.unwrap_err();
        match err {
            ExecutionError::Status { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("doesn't exist"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_token_surfaces_status() {
        let mock = Arc::new(MockJudge0::default());
        let base_url = spawn_mock(mock).await;
        let client = Judge0Client::new(base_url);

        let err = client.fetch("missing").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_tester_over_http() {
        let results = vec![TestResult {
            test_case_id: 1,
            passed: true,
            input: "[2]".to_string(),
            expected: "4".to_string(),
            actual: "4".to_string(),
            execution_time: Some(0),
            error: None,
            status: TestStatus::Passed,
        }];
        let mock = Arc::new(MockJudge0 {
            pending_polls: 1,
            stdout: format_result_block(&results).unwrap(),
            ..Default::default()
        });
        let base_url = spawn_mock(mock.clone()).await;

        let tester = AutomatedTester::new(Judge0Client::new(base_url), TemplateRegistry::builtin().unwrap())
            .with_poll_policy(fast_policy());
        let report = tester
            .run(AutomatedTestConfig {
                user_code: "def square(x):\n    return x * x\n".to_string(),
                language: "python".to_string(),
                test_cases: vec![TestCase {
                    input: vec![json!(2)],
                    expected: json!(4),
                    explanation: None,
                }],
                function_name: None,
                time_limit: Some(1.0),
                memory_limit: None,
            })
            .await
            .unwrap();

        assert_eq!(report.overall_status, OverallStatus::Accepted);
        assert_eq!(report.function_name, "square");
        assert_eq!(report.memory_kb, Some(9876));
        let body = &mock.bodies.lock().unwrap()[0];
        assert_eq!(body["language_id"], json!(71));
        assert_eq!(body["cpu_time_limit"], json!(1.0));
        assert_eq!(body["memory_limit"], json!(128000));
    }

    /// Test: two-sum end to end against the configured Judge0
    #[tokio::test]
    #[ignore] // Requires a running Judge0 (JUDGE0_API_URL)
    async fn test_live_judge0_python_two_sum() {
        let config = JudgeConfig::from_env();
        let tester = AutomatedTester::new(Judge0Client::from_config(&config), TemplateRegistry::builtin().unwrap())
            .with_limits(config.limits)
            .with_poll_policy(config.poll_policy());

        let report = tester
            .run(AutomatedTestConfig {
                user_code: "def twoSum(nums, target):\n    seen = {}\n    for i, n in enumerate(nums):\n        if target - n in seen:\n            return [seen[target - n], i]\n        seen[n] = i\n".to_string(),
                language: "python".to_string(),
                test_cases: vec![
                    TestCase {
                        input: vec![json!([2, 7, 11, 15]), json!(9)],
                        expected: json!([0, 1]),
                        explanation: None,
                    },
                    TestCase {
                        input: vec![json!([3, 2, 4]), json!(6)],
                        expected: json!([0, 0]),
                        explanation: None,
                    },
                ],
                function_name: Some("twoSum".to_string()),
                time_limit: None,
                memory_limit: None,
            })
            .await
            .expect("Judge0 run failed");

        assert_eq!(report.overall_status, OverallStatus::WrongAnswer);
        assert_eq!(report.test_results[1].actual, "[1,2]");
    }

    fn live_two_sum_run(language: &str, user_code: &str) -> AutomatedTestConfig {
        AutomatedTestConfig {
            user_code: user_code.to_string(),
            language: language.to_string(),
            test_cases: vec![
                TestCase {
                    input: vec![json!([2, 7, 11, 15]), json!(9)],
                    expected: json!([0, 1]),
                    explanation: None,
                },
                TestCase {
                    input: vec![json!([3, 2, 4]), json!(6)],
                    expected: json!([0, 0]),
                    explanation: None,
                },
            ],
            function_name: Some("twoSum".to_string()),
            time_limit: None,
            memory_limit: None,
        }
    }

    /// Test: the C++ harness on a real Judge0 (needs nlohmann/json in the image)
    #[tokio::test]
    #[ignore] // Requires a running Judge0 (JUDGE0_API_URL)
    async fn test_live_judge0_cpp_two_sum() {
        let config = JudgeConfig::from_env();
        let tester = AutomatedTester::new(Judge0Client::from_config(&config), TemplateRegistry::builtin().unwrap())
            .with_poll_policy(config.poll_policy());

        let code = "vector<int> twoSum(vector<int> nums, int target) {\n    unordered_map<int, int> seen;\n    for (int i = 0; i < (int)nums.size(); i++) {\n        auto it = seen.find(target - nums[i]);\n        if (it != seen.end()) return {it->second, i};\n        seen[nums[i]] = i;\n    }\n    return {};\n}\n";
        let report = tester
            .run(live_two_sum_run("cpp", code))
            .await
            .expect("Judge0 run failed");

        assert_eq!(report.overall_status, OverallStatus::WrongAnswer);
        assert!(report.test_results[0].passed);
        assert_eq!(report.test_results[1].actual, "[1,2]");
        assert_eq!(report.test_results[1].status, TestStatus::Failed);
    }

    /// Test: the Java harness on a real Judge0 (needs Gson on the classpath)
    #[tokio::test]
    #[ignore] // Requires a running Judge0 (JUDGE0_API_URL)
    async fn test_live_judge0_java_two_sum() {
        let config = JudgeConfig::from_env();
        let tester = AutomatedTester::new(Judge0Client::from_config(&config), TemplateRegistry::builtin().unwrap())
            .with_poll_policy(config.poll_policy());

        let code = "class Solution {\n    public int[] twoSum(int[] nums, int target) {\n        Map<Integer, Integer> seen = new HashMap<>();\n        for (int i = 0; i < nums.length; i++) {\n            Integer j = seen.get(target - nums[i]);\n            if (j != null) return new int[] {j, i};\n            seen.put(nums[i], i);\n        }\n        return new int[0];\n    }\n}\n";
        let report = tester
            .run(live_two_sum_run("java", code))
            .await
            .expect("Judge0 run failed");

        assert_eq!(report.overall_status, OverallStatus::WrongAnswer);
        assert!(report.test_results[0].passed);
        assert_eq!(report.test_results[1].actual, "[1,2]");
        assert_eq!(report.test_results[1].status, TestStatus::Failed);
    }

    /// Test: a compile error comes back as a batch failure
    #[tokio::test]
    #[ignore] // Requires a running Judge0 (JUDGE0_API_URL)
    async fn test_live_judge0_cpp_compile_error() {
        let config = JudgeConfig::from_env();
        let tester = AutomatedTester::new(Judge0Client::from_config(&config), TemplateRegistry::builtin().unwrap())
            .with_poll_policy(config.poll_policy());

        let report = tester
            .run(AutomatedTestConfig {
                user_code: "int twice(int x) { return x * 2 }".to_string(),
                language: "cpp".to_string(),
                test_cases: vec![TestCase {
                    input: vec![json!(2)],
                    expected: json!(4),
                    explanation: None,
                }],
                function_name: Some("twice".to_string()),
                time_limit: None,
                memory_limit: None,
            })
            .await
            .expect("Judge0 run failed");

        assert_eq!(report.overall_status, OverallStatus::CompilationError);
        assert!(report.test_results.is_empty());
    }
}
