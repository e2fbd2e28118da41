#![allow(dead_code)]

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use xcontactflow::{CallConfig, Simulator};

pub const CALLER: &str = "+447700900000";
pub const MAIN_NUMBER: &str = "+441234567890";

/// Honors RUST_LOG when set; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn success(next: &str) -> Value {
    json!([{"condition": "Success", "transition": next}])
}

fn prompt(id: &str, text: &str, next: &str) -> Value {
    json!({
        "id": id,
        "type": "PlayPrompt",
        "branches": success(next),
        "parameters": [
            {"name": "Text", "value": text},
            {"name": "TextToSpeechType", "value": "text"}
        ]
    })
}

/// Greets, captures an account number, looks up a balance and offers a menu
/// leading to the Billing flow or the Support queue.
pub fn main_flow() -> Value {
    json!({
        "modules": [
            prompt("welcome", "Welcome caller $.System.CustomerNumber", "attrs"),
            {
                "id": "attrs",
                "type": "SetAttributes",
                "branches": success("ask"),
                "parameters": [{"name": "Attribute", "key": "language", "value": "en-GB"}]
            },
            {
                "id": "ask",
                "type": "StoreUserInput",
                "branches": [
                    {"condition": "Success", "transition": "lookup"},
                    {"condition": "Error", "transition": "bye"}
                ],
                "parameters": [
                    {"name": "Text", "value": "Please enter your account number"},
                    {"name": "TextToSpeechType", "value": "text"},
                    {"name": "CustomerInputType", "value": "Custom"},
                    {"name": "Timeout", "value": "7"},
                    {"name": "MaxDigits", "value": 8},
                    {"name": "EncryptEntry", "value": false},
                    {"name": "DisableCancel", "value": false}
                ]
            },
            {
                "id": "lookup",
                "type": "InvokeExternalResource",
                "target": "Lambda",
                "branches": [
                    {"condition": "Success", "transition": "balance"},
                    {"condition": "Error", "transition": "sorry"}
                ],
                "parameters": [
                    {"name": "FunctionArn", "value": "arn:aws:lambda:eu-west-2:123456789012:function:balance-lookup"},
                    {"name": "TimeLimit", "value": "3"},
                    {"name": "Parameter", "key": "account", "value": "Stored customer input", "namespace": "System"}
                ]
            },
            prompt("balance", "Your balance is $.External.balance pounds", "menu"),
            {
                "id": "menu",
                "type": "GetUserInput",
                "target": "Digits",
                "branches": [
                    {"condition": "Evaluate", "conditionType": "Equals", "conditionValue": "1", "transition": "to-billing"},
                    {"condition": "Evaluate", "conditionType": "Equals", "conditionValue": "2", "transition": "set-queue"},
                    {"condition": "Timeout", "transition": "bye"},
                    {"condition": "NoMatch", "transition": "bye"},
                    {"condition": "Error", "transition": "bye"}
                ],
                "parameters": [
                    {"name": "Text", "value": "Press 1 for billing or 2 for support"},
                    {"name": "Timeout", "value": "5"}
                ]
            },
            {
                "id": "to-billing",
                "type": "Transfer",
                "target": "Flow",
                "branches": [{"condition": "Error", "transition": "bye"}],
                "parameters": [
                    {"name": "ContactFlowId", "value": "arn:aws:connect:flow/billing", "resourceName": "Billing"}
                ]
            },
            {
                "id": "set-queue",
                "type": "SetQueue",
                "branches": success("hours"),
                "parameters": [
                    {"name": "Queue", "value": "arn:aws:connect:queue/support", "resourceName": "Support"}
                ]
            },
            {
                "id": "hours",
                "type": "CheckHoursOfOperation",
                "branches": [
                    {"condition": "True", "transition": "to-queue"},
                    {"condition": "False", "transition": "closed"},
                    {"condition": "Error", "transition": "bye"}
                ],
                "parameters": []
            },
            {
                "id": "to-queue",
                "type": "Transfer",
                "target": "Queue",
                "branches": [
                    {"condition": "AtCapacity", "transition": "bye"},
                    {"condition": "Error", "transition": "bye"}
                ],
                "parameters": []
            },
            prompt("closed", "We are closed", "bye"),
            prompt("sorry", "Sorry, we could not find your account", "bye"),
            {"id": "bye", "type": "Disconnect", "branches": [], "parameters": []}
        ],
        "start": "welcome",
        "metadata": {"name": "Main", "description": "Inbound banking line", "type": "contactFlow"}
    })
}

pub fn billing_flow() -> Value {
    json!({
        "modules": [
            prompt("billing-start", "Welcome to billing", "billing-end"),
            {"id": "billing-end", "type": "Disconnect"}
        ],
        "start": "billing-start",
        "metadata": {"name": "Billing"}
    })
}

/// Simulator with both flows loaded and a balance lambda that knows one
/// account.
pub fn simulator() -> Simulator {
    init_tracing();
    let mut sim = Simulator::new();
    sim.load_flow_json(&main_flow().to_string()).unwrap();
    sim.load_flow_json(&billing_flow().to_string()).unwrap();
    sim.set_starting_flow_for(MAIN_NUMBER, "Main").unwrap();
    sim.register_lambda("balance-lookup", |event: Value| -> Result<Value, String> {
        match event["Details"]["Parameters"]["account"].as_str() {
            Some("12345678") => Ok(json!({"balance": "10"})),
            other => Err(format!("unknown account {:?}", other)),
        }
    });
    sim
}

pub fn inbound() -> CallConfig {
    CallConfig::new(CALLER, MAIN_NUMBER)
}
