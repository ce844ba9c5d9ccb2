//! LLM prompts for extraction and pagination discovery.

/// System prompt for field extraction.
pub const SYSTEM_MESSAGE: &str = "You extract structured data from text and return it as JSON. \
Output only the extracted data as a JSON document: no commentary, no explanations, no surrounding text. \
If a value is missing, leave it empty; if the text is in another language, still extract what it says. \
Read the text below and answer with pure JSON only.";

/// Opening of every user message; guidance and page text follow.
pub const USER_MESSAGE: &str =
    "Extract the following information from the provided text:\nPage content:\n\n";

/// System prompt for pagination discovery.
pub const PAGINATION_PROMPT: &str = r#"
You find pagination links in the markdown of a web page.
Produce the list of pagination URLs for the listing, following the pattern in which only a page number changes.

- Find the pattern:
  Look for URLs in the text that differ only by a numeric page index.
  When the numbers start low and increase, produce the whole sequence, including pages whose URLs do not appear in the text (for example, if pages 1, 2 and 4 appear, page 3 belongs in the list too).

- Build complete URLs:
  When only a path or fragment of a URL is present, join it with the base URL of the page being analyzed.
  Every URL you return must be absolute and open the page it refers to.

- Follow the user's indications:
  Apply any extra instructions given below when producing the list.

Respond with a single JSON object of this shape and nothing else:
{
    "page_urls": ["url1", "url2", "url3", ..., "urlN"]
}

Return only the JSON object, ordered by page number.
"#;

/// Pagination system prompt for one page.
pub fn format_pagination_prompt(guidance: &str, url: &str) -> String {
    let mut prompt = format!("{}\nThe page being analyzed is: {}\n", PAGINATION_PROMPT, url);
    if guidance.trim().is_empty() {
        prompt.push_str("No special user indications. Use default pagination logic.\n\n");
    } else {
        prompt.push_str(&format!("User indications: {}\n\n", guidance));
    }
    prompt
}

/// User message sent to every backend.
pub fn format_user_message(guidance: &str, content: &str) -> String {
    format!("{} {} {}", USER_MESSAGE, guidance, content)
}

/// Guidance naming the fields to extract.
pub fn format_field_guidance(field_names: &[&str]) -> String {
    format!("Fields: {}", field_names.join(", "))
}
