//! Tool-calling session integration tests
//!
//! Drives full sessions through the scripted backend with in-test tools.

use async_trait::async_trait;
use palaver::agent::{Session, SessionConfig, SessionObserver, SessionState, Tool, ToolRegistry};
use palaver::error::{PalaverError, Result};
use palaver::llm::{
    AssistantReply, ConversationMessage, ParamKind, ScriptedBackend, ToolCallRequest,
    ToolDescriptor,
};
use palaver::tools::ToolId;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Handler = fn(&Value) -> Result<String>;

/// Tool that records the arguments it receives and answers through `handler`.
struct StubTool {
    id: ToolId,
    descriptor: ToolDescriptor,
    handler: Handler,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl StubTool {
    fn new(id: ToolId, handler: Handler) -> Self {
        Self {
            id,
            descriptor: ToolDescriptor::new(id.as_str(), "stub").required(
                "city",
                ParamKind::String,
                "City",
            ),
            handler,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_limit(mut self) -> Self {
        self.descriptor = ToolDescriptor::new(self.id.as_str(), "stub listing").optional(
            "limit",
            ParamKind::Integer,
            "How many",
        );
        self
    }

    fn seen(&self) -> Arc<Mutex<Vec<Value>>> {
        self.seen.clone()
    }
}

#[async_trait]
impl Tool for StubTool {
    fn id(&self) -> ToolId {
        self.id
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn error_context(&self) -> &'static str {
        "fetching weather"
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        self.seen.lock().unwrap().push(arguments.clone());
        (self.handler)(arguments)
    }
}

fn weather_report(arguments: &Value) -> Result<String> {
    let city = arguments["city"].as_str().unwrap_or("?");
    Ok(format!("{}: Sunny, +18°C", city))
}

fn echo_limit(arguments: &Value) -> Result<String> {
    Ok(format!("limit={}", arguments.get("limit").cloned().unwrap_or(Value::Null)))
}

fn call(name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest::new(name, arguments)
}

fn tool_contents(messages: &[ConversationMessage]) -> Vec<(String, String)> {
    messages
        .iter()
        .filter_map(|m| match m {
            ConversationMessage::Tool {
                tool_name, content, ..
            } => Some((tool_name.clone(), content.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_weather_question_round_trip() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![call("get_weather", json!({"city": "Paris"}))]),
        AssistantReply::text("It is sunny and 18°C in Paris."),
    ]);

    let mut session = Session::new(
        &backend,
        &registry,
        SessionConfig::new(10),
        Some("You are a weather assistant."),
        "What's the weather in Paris?",
    );
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.answer, "It is sunny and 18°C in Paris.");
    assert_eq!(outcome.turns, 2);
    assert!(!outcome.truncated);
    assert_eq!(outcome.tool_calls.len(), 1);
    assert_eq!(outcome.tool_calls[0].result, "Paris: Sunny, +18°C");

    let conversation = session.conversation();
    assert_eq!(conversation.len(), 4);
    assert_eq!(conversation.system_prompt(), Some("You are a weather assistant."));

    // The second request carried the tool result.
    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        tool_contents(requests[1].conversation.messages()),
        vec![("get_weather".to_string(), "Paris: Sunny, +18°C".to_string())]
    );
    assert_eq!(requests[0].tool_names, vec!["get_weather".to_string()]);
}

#[tokio::test]
async fn test_direct_answer_runs_no_tools() {
    let stub = StubTool::new(ToolId::GetWeather, weather_report);
    let seen = stub.seen();
    let registry = ToolRegistry::new().with(stub).unwrap();
    let backend = ScriptedBackend::new(vec![AssistantReply::text("Hello!")]);

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "Hi");
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.answer, "Hello!");
    assert_eq!(outcome.turns, 1);
    assert!(outcome.tool_calls.is_empty());
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.state(), SessionState::Done);
}

#[tokio::test]
async fn test_unknown_tool_is_reported_to_model() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![call("get_forecast", json!({"city": "Oslo"}))]),
        AssistantReply::text("Sorry, I cannot get a forecast."),
    ]);

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "Forecast?");
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.answer, "Sorry, I cannot get a forecast.");
    assert_eq!(
        tool_contents(session.conversation().messages()),
        vec![("get_forecast".to_string(), "Unknown function: get_forecast".to_string())]
    );
}

#[tokio::test]
async fn test_calls_in_one_reply_run_in_order() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap()
        .with(StubTool::new(ToolId::GetTemperature, weather_report))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![
            call("get_weather", json!({"city": "A"})),
            call("get_temperature", json!({"city": "B"})),
            call("get_weather", json!({"city": "C"})),
        ]),
        AssistantReply::text("done"),
    ]);

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "ABC");
    session.run().await.unwrap();

    let results: Vec<String> = tool_contents(session.conversation().messages())
        .into_iter()
        .map(|(_, content)| content)
        .collect();
    assert_eq!(
        results,
        vec!["A: Sunny, +18°C", "B: Sunny, +18°C", "C: Sunny, +18°C"]
    );
    // Seed, one assistant request, three results, final answer.
    assert_eq!(session.conversation().len(), 6);
}

#[tokio::test]
async fn test_conversation_length_tracks_messages_on_every_step() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![
            call("get_weather", json!({"city": "X"})),
            call("get_weather", json!({"city": "Y"})),
        ]),
        AssistantReply::calls(vec![call("get_weather", json!({"city": "Z"}))]),
        AssistantReply::text("ok"),
    ]);

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "q");
    while session.state() != SessionState::Done {
        session.step().await.unwrap();
        let c = session.conversation();
        assert_eq!(c.len(), 1 + c.count_assistant() + c.count_tool());
    }
    assert_eq!(session.conversation().count_tool(), 3);
}

#[tokio::test]
async fn test_replaying_a_script_gives_the_same_conversation() {
    let script = || {
        vec![
            AssistantReply::calls(vec![call("get_weather", json!({"city": "Paris"}))]),
            AssistantReply::text("Sunny."),
        ]
    };
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();

    let first = ScriptedBackend::new(script());
    let mut a = Session::new(&first, &registry, SessionConfig::new(10), None, "Paris?");
    a.run().await.unwrap();

    let second = ScriptedBackend::new(script());
    let mut b = Session::new(&second, &registry, SessionConfig::new(10), None, "Paris?");
    b.run().await.unwrap();

    assert_eq!(a.conversation(), b.conversation());
}

fn paris_temperature(_arguments: &Value) -> Result<String> {
    Ok("+18°C".to_string())
}

#[tokio::test]
async fn test_paris_temperature_scenario() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetTemperature, paris_temperature))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![call("get_temperature", json!({"city": "Paris"}))]),
        AssistantReply::text("It's 18°C in Paris."),
    ]);

    let mut session = Session::new(
        &backend,
        &registry,
        SessionConfig::new(10),
        None,
        "What's the temperature in Paris?",
    );
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.answer, "It's 18°C in Paris.");
    assert_eq!(session.state(), SessionState::Done);
    assert_eq!(
        tool_contents(session.conversation().messages()),
        vec![("get_temperature".to_string(), "+18°C".to_string())]
    );
}

#[tokio::test]
async fn test_every_request_is_a_prefix_of_the_final_conversation() {
    let stub = StubTool::new(ToolId::GetTemperature, paris_temperature);
    let seen = stub.seen();
    let registry = ToolRegistry::new().with(stub).unwrap();
    let paris = || call("get_temperature", json!({"city": "Paris"}));
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![paris(), paris()]),
        AssistantReply::calls(vec![paris()]),
        AssistantReply::text("It's 18°C in Paris."),
    ]);

    let mut session = Session::new(
        &backend,
        &registry,
        SessionConfig::new(10),
        Some("You are a weather assistant."),
        "What's the temperature in Paris?",
    );
    let outcome = session.run().await.unwrap();
    assert_eq!(outcome.answer, "It's 18°C in Paris.");

    let final_messages = session.conversation().messages();
    assert_eq!(final_messages.len(), 7);

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    let mut previous_len = 0;
    for request in &requests {
        let sent = request.conversation.messages();
        assert!(sent.len() > previous_len);
        assert_eq!(sent, &final_messages[..sent.len()]);
        assert_eq!(
            request.conversation.system_prompt(),
            Some("You are a weather assistant.")
        );
        previous_len = sent.len();
    }
    assert_eq!(
        requests.iter().map(|r| r.conversation.len()).collect::<Vec<_>>(),
        vec![1, 4, 6]
    );

    // Identical calls are executed and recorded separately.
    assert_eq!(seen.lock().unwrap().len(), 3);
    let tools = tool_contents(requests[1].conversation.messages());
    assert_eq!(
        tools,
        vec![
            ("get_temperature".to_string(), "+18°C".to_string()),
            ("get_temperature".to_string(), "+18°C".to_string()),
        ]
    );
    assert_eq!(session.conversation().count_tool(), 3);
}

#[tokio::test]
async fn test_limit_policy_clamps_and_injects() {
    let listing = StubTool::new(ToolId::GetTopStories, echo_limit).with_limit();
    let listing_seen = listing.seen();
    let details = StubTool::new(ToolId::GetStoryDetails, echo_limit);
    let details_seen = details.seen();
    let registry = ToolRegistry::new()
        .with(listing)
        .unwrap()
        .with(details)
        .unwrap();

    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![
            call("get_top_stories", json!({"limit": 20})),
            call("get_top_stories", json!({})),
            call("get_top_stories", json!({"limit": 3})),
            call("get_story_details", json!({"story_id": 1})),
        ]),
        AssistantReply::text("summary"),
    ]);

    let mut session = Session::new(
        &backend,
        &registry,
        SessionConfig::new(10).with_limit(5),
        None,
        "What's hot?",
    );
    let outcome = session.run().await.unwrap();

    let limits: Vec<Value> = listing_seen
        .lock()
        .unwrap()
        .iter()
        .map(|args| args["limit"].clone())
        .collect();
    assert_eq!(limits, vec![json!(5), json!(5), json!(3)]);
    assert_eq!(details_seen.lock().unwrap()[0], json!({"story_id": 1}));

    // Records carry the effective arguments.
    assert_eq!(outcome.tool_calls[0].arguments, json!({"limit": 5}));
}

#[tokio::test]
async fn test_turn_limit_truncates() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();
    let looping = || AssistantReply {
        content: "Let me check again.".to_string(),
        tool_calls: vec![call("get_weather", json!({"city": "Bergen"}))],
    };
    let backend = ScriptedBackend::new(vec![looping(), looping(), looping()]);

    let mut session = Session::new(&backend, &registry, SessionConfig::new(2), None, "Rain?");
    let outcome = session.run().await.unwrap();

    assert!(outcome.truncated);
    assert_eq!(outcome.turns, 2);
    assert_eq!(outcome.answer, "Let me check again.");
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_model_failure_ends_the_session() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();
    let backend = ScriptedBackend::new(vec![AssistantReply::calls(vec![call(
        "get_weather",
        json!({"city": "Paris"}),
    )])]);
    backend.push_error("model 'nope' not found");

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "Paris?");
    let err = session.run().await.unwrap_err();

    assert!(matches!(err, PalaverError::Model(_)));
    assert_eq!(session.conversation().count_tool(), 1);
}

#[tokio::test]
async fn test_tool_errors_become_results() {
    fn bad_arguments(_: &Value) -> Result<String> {
        Err(PalaverError::InvalidArguments {
            tool: "get_weather".to_string(),
            reason: "missing field `city`".to_string(),
        })
    }
    fn offline(_: &Value) -> Result<String> {
        Err(PalaverError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }

    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, bad_arguments))
        .unwrap()
        .with(StubTool::new(ToolId::GetWeatherForecast, offline))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![
            call("get_weather", json!({})),
            call("get_weather_forecast", json!({"city": "Oslo"})),
        ]),
        AssistantReply::text("Weather is unavailable."),
    ]);

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "Oslo?");
    let outcome = session.run().await.unwrap();

    assert_eq!(
        outcome.tool_calls[0].result,
        "Error: invalid arguments for get_weather: missing field `city`"
    );
    assert_eq!(
        outcome.tool_calls[1].result,
        "Error fetching weather: IO error: connection refused"
    );
    assert_eq!(outcome.answer, "Weather is unavailable.");
}

#[derive(Default)]
struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl SessionObserver for Transcript {
    fn on_tool_call(&self, name: &str, arguments: &Value) {
        self.lines.lock().unwrap().push(format!("call {} {}", name, arguments));
    }

    fn on_tool_result(&self, name: &str, result: &str) {
        self.lines.lock().unwrap().push(format!("result {} {}", name, result));
    }
}

#[tokio::test]
async fn test_observer_sees_calls_and_results() {
    let registry = ToolRegistry::new()
        .with(StubTool::new(ToolId::GetWeather, weather_report))
        .unwrap();
    let backend = ScriptedBackend::new(vec![
        AssistantReply::calls(vec![
            call("get_weather", json!({"city": "Rome"})),
            call("get_moon", json!({})),
        ]),
        AssistantReply::text("ok"),
    ]);
    let transcript = Transcript::default();

    let mut session = Session::new(&backend, &registry, SessionConfig::new(10), None, "Rome?")
        .with_observer(&transcript);
    session.run().await.unwrap();

    assert_eq!(
        *transcript.lines.lock().unwrap(),
        vec![
            r#"call get_weather {"city":"Rome"}"#.to_string(),
            "result get_weather Rome: Sunny, +18°C".to_string(),
            "call get_moon {}".to_string(),
            "result get_moon Unknown function: get_moon".to_string(),
        ]
    );
}
