//! Structured output example with a runtime-built JSON schema

use llm_client::{into_strict, ChatRequest, LlmClient, Message, ResponseFormat};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = LlmClient::from_env()?;

    // Every field is a string; strict mode wants them all required
    let schema = into_strict(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "age": {"type": "string"},
            "occupation": {"type": "string"}
        }
    }));

    let request = ChatRequest::new("gpt-4o-mini")
        .message(Message::system("Extract person information from text."))
        .message(Message::user("John Smith is a 35 year old software engineer."))
        .response_format(ResponseFormat::json_schema("person", schema));

    let response = client.chat_completion(&request).await?;
    println!("Structured output: {}", response.content);

    let parsed: serde_json::Value = serde_json::from_str(&response.content)?;
    println!("\nParsed:");
    println!("  Name: {}", parsed["name"]);
    println!("  Age: {}", parsed["age"]);
    println!("  Occupation: {}", parsed["occupation"]);

    if let Some(usage) = response.usage {
        println!("\nTokens: {} in / {} out", usage.prompt_tokens, usage.completion_tokens);
    }

    Ok(())
}
