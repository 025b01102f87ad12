//! Command registry and dispatch
//!
//! One statically declared entry per client operation; the table replaces
//! the runtime introspection the original tool relied on. Arity bounds come
//! from the client method signatures: required parameters set the minimum,
//! required plus optional the maximum.

use std::future::Future;
use std::pin::Pin;

use anyhow::Context;
use scrac_client::SignalApiClient;
use serde_json::Value;

use crate::error::UsageError;

type CommandFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Option<Value>>> + Send + 'a>>;

/// Descriptor for one dispatchable command
pub struct CommandSpec {
    /// Command name, as typed on the command line
    pub name: &'static str,
    /// Space-joined parameter names, optional ones in brackets
    pub params: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    /// Printed for the `<command> help` form
    pub help: &'static str,
    run: for<'a> fn(&'a SignalApiClient, &'a [String]) -> CommandFuture<'a>,
}

/// All dispatchable commands, mirroring the client API surface
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "about",
        params: "",
        min_args: 0,
        max_args: 0,
        help: "Show server information: build, mode, version and supported API versions.",
        run: run_about,
    },
    CommandSpec {
        name: "account_info",
        params: "",
        min_args: 0,
        max_args: 0,
        help: "Show registration state of the configured account.",
        run: run_account_info,
    },
    CommandSpec {
        name: "receive",
        params: "",
        min_args: 0,
        max_args: 0,
        help: "Fetch all pending messages for the configured account.",
        run: run_receive,
    },
    CommandSpec {
        name: "send",
        params: "message [recipient]",
        min_args: 1,
        max_args: 2,
        help: "Send a text message. Without a recipient the message goes to your own number (note to self).",
        run: run_send,
    },
    CommandSpec {
        name: "send_reaction",
        params: "recipient timestamp emoji",
        min_args: 3,
        max_args: 3,
        help: "React to a message, identified by its sender and timestamp.",
        run: run_send_reaction,
    },
    CommandSpec {
        name: "list_groups",
        params: "",
        min_args: 0,
        max_args: 0,
        help: "List the groups the configured account is a member of.",
        run: run_list_groups,
    },
    CommandSpec {
        name: "create_group",
        params: "name member",
        min_args: 2,
        max_args: 2,
        help: "Create a group with the given name and one initial member.",
        run: run_create_group,
    },
    CommandSpec {
        name: "update_profile",
        params: "name [base64_avatar]",
        min_args: 1,
        max_args: 2,
        help: "Update the profile display name and, optionally, the avatar (base64 encoded image).",
        run: run_update_profile,
    },
];

/// Look up a command by name
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

/// Help fragment listing every command, shown for the positional argument
pub fn positional_help() -> String {
    let names: Vec<&str> = COMMANDS.iter().map(|spec| spec.name).collect();
    format!(
        "[ {} ] type \"<command> help\" to get further information on this command",
        names.join(" | ")
    )
}

/// Outcome of a dispatch
#[derive(Debug)]
pub enum Dispatched {
    /// Help text for the `<command> help` form; nothing was invoked
    Help(&'static str),
    /// Result of an invoked operation, when it produced one
    Output(Option<Value>),
}

/// Validate the command tokens against the registry and invoke the operation
///
/// `tokens[0]` is the command name, the rest are its arguments.
pub async fn dispatch(client: &SignalApiClient, tokens: &[String]) -> anyhow::Result<Dispatched> {
    let spec = find(&tokens[0]).ok_or(UsageError::UnknownCommand)?;

    if tokens.len() == 2 && tokens[1] == "help" {
        return Ok(Dispatched::Help(spec.help));
    }

    let args = &tokens[1..];
    if args.len() < spec.min_args || args.len() > spec.max_args {
        return Err(UsageError::ArityMismatch {
            expected: spec.params.to_string(),
        }
        .into());
    }

    let output = (spec.run)(client, args).await?;
    Ok(Dispatched::Output(output))
}

/// Render a command result for the console
///
/// JSON mode serializes the value; plain mode prints strings bare and
/// everything else as pretty-printed JSON.
pub fn render(value: &Value, json: bool) -> String {
    if json {
        value.to_string()
    } else {
        match value {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

fn run_about<'a>(client: &'a SignalApiClient, _args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move { Ok(Some(serde_json::to_value(client.about().await?)?)) })
}

fn run_account_info<'a>(client: &'a SignalApiClient, _args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move { Ok(Some(serde_json::to_value(client.account_info().await?)?)) })
}

fn run_receive<'a>(client: &'a SignalApiClient, _args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move { Ok(Some(Value::Array(client.receive().await?))) })
}

fn run_send<'a>(client: &'a SignalApiClient, args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move {
        let recipient = args.get(1).map(String::as_str);
        let response = client.send(&args[0], recipient).await?;
        Ok(Some(serde_json::to_value(response)?))
    })
}

fn run_send_reaction<'a>(client: &'a SignalApiClient, args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move {
        let timestamp: u64 = args[1]
            .parse()
            .with_context(|| format!("timestamp must be an integer, got {:?}", args[1]))?;
        client.send_reaction(&args[0], timestamp, &args[2]).await?;
        Ok(None)
    })
}

fn run_list_groups<'a>(client: &'a SignalApiClient, _args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move { Ok(Some(serde_json::to_value(client.list_groups().await?)?)) })
}

fn run_create_group<'a>(client: &'a SignalApiClient, args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move {
        let created = client.create_group(&args[0], &args[1]).await?;
        Ok(Some(serde_json::to_value(created)?))
    })
}

fn run_update_profile<'a>(client: &'a SignalApiClient, args: &'a [String]) -> CommandFuture<'a> {
    Box::pin(async move {
        client
            .update_profile(&args[0], args.get(1).map(String::as_str))
            .await?;
        Ok(None)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    async fn client_for(server: &MockServer) -> SignalApiClient {
        SignalApiClient::new(&server.uri(), "+15550001", None, true).unwrap()
    }

    #[test]
    fn test_registry_lookup() {
        assert!(find("send").is_some());
        assert!(find("about").is_some());
        assert!(find("frobnicate").is_none());
    }

    #[test]
    fn test_registry_arity_is_consistent() {
        for spec in COMMANDS {
            assert!(spec.min_args <= spec.max_args, "{} bounds inverted", spec.name);
        }
    }

    #[test]
    fn test_positional_help_lists_all_commands() {
        let help = positional_help();
        for spec in COMMANDS {
            assert!(help.contains(spec.name), "{} missing from help", spec.name);
        }
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        let err = dispatch(&client, &tokens(&["frobnicate"])).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UsageError>(),
            Some(UsageError::UnknownCommand)
        ));
    }

    #[tokio::test]
    async fn test_arity_below_minimum() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        let err = dispatch(&client, &tokens(&["send"])).await.unwrap_err();
        match err.downcast_ref::<UsageError>() {
            Some(UsageError::ArityMismatch { expected }) => {
                assert_eq!(expected, "message [recipient]");
            }
            other => panic!("expected ArityMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_arity_above_maximum() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        let err = dispatch(&client, &tokens(&["send", "a", "b", "c"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UsageError>(),
            Some(UsageError::ArityMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_help_form_invokes_nothing() {
        // No mocks mounted: an HTTP call would fail the dispatch.
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        match dispatch(&client, &tokens(&["send", "help"])).await.unwrap() {
            Dispatched::Help(text) => assert_eq!(text, find("send").unwrap().help),
            Dispatched::Output(_) => panic!("help form must not invoke"),
        }
    }

    #[tokio::test]
    async fn test_send_dispatches_within_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(body_json(serde_json::json!({
                "number": "+15550001",
                "recipients": ["+15550001"],
                "message": "hello"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"timestamp": 7u64})),
            )
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        match dispatch(&client, &tokens(&["send", "hello"])).await.unwrap() {
            Dispatched::Output(Some(value)) => assert_eq!(value["timestamp"], 7),
            _ => panic!("expected an output value"),
        }
    }

    #[tokio::test]
    async fn test_send_reaction_rejects_bad_timestamp() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        let err = dispatch(&client, &tokens(&["send_reaction", "+15550002", "soon", "👍"]))
            .await
            .unwrap_err();
        // Not a usage error: arity was fine, the value itself is bad.
        assert!(err.downcast_ref::<UsageError>().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_produces_no_output() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/profiles/+15550001"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        match dispatch(&client, &tokens(&["update_profile", "Alice"])).await.unwrap() {
            Dispatched::Output(None) => {}
            _ => panic!("expected empty output"),
        }
    }

    #[test]
    fn test_render_plain_and_json() {
        let string = Value::String("sent".to_string());
        assert_eq!(render(&string, false), "sent");
        assert_eq!(render(&string, true), "\"sent\"");

        let object = serde_json::json!({"timestamp": 7});
        assert_eq!(render(&object, true), r#"{"timestamp":7}"#);
        assert!(render(&object, false).contains("\"timestamp\": 7"));
    }
}
