//! Prompt templates and construction.
//!
//! Building a prompt is pure string substitution and never fails: context
//! that is missing or empty is rendered as an explicit placeholder ("None",
//! "No previous context") so a request can never die here. All JSON keys the
//! prompts ask for are camelCase, matching the wire schema the validators
//! expect.

use serde_json::Value;

use crate::session::{ExistingEntity, ScreenshotData};

const SESSION_ANALYZE_PROMPT: &str = r#"You are an AI assistant that analyzes screenshots and extracts structured information.

## Task
1. Perform OCR to extract all visible text from the image
2. Identify the main entity type (e.g., hotel, restaurant, job posting, product, article)
3. Extract structured information based on the entity type
4. Compare with existing entities to determine if this is the same entity (different page/view)

## Existing Entities in Session
{existing_entities}

## Output Format
Return a valid JSON object with this structure:
{
  "rawText": "All extracted text from the image...",
  "entity": {
    "type": "hotel|restaurant|job|product|flight|article|other",
    "isNew": true|false,
    "mergeWithId": "id of the existing entity if merging, null otherwise",
    "confidence": 0.0-1.0,
    "data": {
      "...": "structured data based on the entity type; for a hotel: name, price, location, amenities, rating; for a job: title, company, salary, location, requirements; include all relevant fields found in the screenshot"
    }
  }
}

## Rules
- Extract as much structured information as possible
- If the screenshot shows the same entity as an existing one (same hotel, job, etc.), set isNew to false and provide mergeWithId
- Use context clues to determine the entity type (URL, layout, keywords)
- For prices, include the currency symbol
- For ratings, normalize to a consistent format
- Return ONLY valid JSON, no markdown code blocks
"#;

const SIMPLE_ANALYZE_PROMPT: &str = r#"Analyze this screenshot and extract structured information.

## Task
1. Perform OCR to extract all visible text from the image
2. Identify the main entity types visible (hotel, restaurant, job posting, product, article, etc.)
3. Write a 1-3 sentence summary of what the screenshot shows. Use objective language (e.g., "A screenshot of..."). Do NOT use phrases like "The user is looking at"
4. Extract structured entities with their attributes
5. Suggest an appropriate category and notebook title

## Categories
- trip-planning: Hotels, flights, restaurants, travel
- shopping: Products, electronics, clothing
- job-search: Job postings, careers
- research: Articles, documentation
- content-writing: Writing, notes, drafts
- productivity: Tasks, calendars, projects
- other: Generic or unclear content

## Output Format
Return a valid JSON object:
{
  "rawText": "Full OCR text extracted from screenshot",
  "summary": "1-3 sentence objective description",
  "category": "trip-planning|shopping|job-search|research|content-writing|productivity|other",
  "entities": [
    {
      "type": "hotel|restaurant|job|product|flight|article|other",
      "title": "Entity name/title",
      "attributes": {}
    }
  ],
  "suggestedNotebookTitle": "Short descriptive title for this content"
}

## Rules
- Extract as much structured information as possible
- For prices, include the currency symbol
- For ratings, normalize to a consistent format (e.g., "4.8")
- Return ONLY valid JSON, no markdown code blocks
"#;

const REGENERATE_PROMPT: &str = r#"You are an AI assistant that synthesizes information from multiple screenshots.

## Task
Given the extracted data from multiple screenshots (after some deletions), create a unified set of consolidated entities.

## Previous Summary
{previous_summary}

## Remaining Data
{remaining_data}

## Deleted Screenshot IDs (exclude these)
{deleted_ids}

## Output Format
Return a valid JSON array with consolidated entities:
[
  {
    "entityType": "hotel|restaurant|job|product|flight|article|other",
    "sourceScreenshotIds": ["id1", "id2"],
    "data": {
      "...": "merged and consolidated data from all sources"
    }
  }
]

## Rules
- Merge information from multiple screenshots of the same entity
- Remove any data that came exclusively from deleted screenshots
- When the same field appears in several screenshots, keep the value from the most recently captured one
- Consolidate duplicate information
- Return ONLY valid JSON, no markdown code blocks
"#;

const SUMMARIZE_PROMPT: &str = r#"Generate a comprehensive summary of this research/capture session.

## Session Name
{session_name}

## Entities to Summarize
{entities_data}

## Task
Create a condensed but comprehensive summary with:
1. A 2-4 sentence overview
2. Top 3-5 key highlights
3. 2-3 actionable recommendations
4. Suggested follow-up queries
5. Key topics/tags

## Output Format
Return a valid JSON object:
{
  "condensedSummary": "2-4 sentence AI-generated overview",
  "keyHighlights": ["Highlight 1", "Highlight 2", "Highlight 3"],
  "recommendations": ["Recommendation 1", "Recommendation 2"],
  "mergedEntities": [],
  "suggestedTitle": "Concise title for this session",
  "suggestedQueries": ["Follow-up question 1?", "Follow-up question 2?"],
  "keywords": ["keyword1", "keyword2", "keyword3"]
}

## Rules
- Be concise but informative
- Make recommendations actionable
- Return ONLY valid JSON, no markdown code blocks
"#;

fn pretty_or(value: impl serde::Serialize, placeholder: &str) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| placeholder.to_string())
}

/// Prompt for the session-aware analyze family: the existing-entities listing
/// is embedded so the model can make the same-entity decision itself.
pub fn session_analyze_prompt(existing: &[ExistingEntity]) -> String {
    let entities_str = if existing.is_empty() {
        "None".to_string()
    } else {
        pretty_or(existing, "None")
    };
    SESSION_ANALYZE_PROMPT.replace("{existing_entities}", &entities_str)
}

/// Prompt for the simple analyze family: no session context.
pub fn simple_analyze_prompt() -> String {
    SIMPLE_ANALYZE_PROMPT.to_string()
}

pub fn regenerate_prompt(
    remaining: &[ScreenshotData],
    deleted_ids: &[String],
    previous_summary: Option<&str>,
) -> String {
    let summary = match previous_summary {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "No previous context".to_string(),
    };
    REGENERATE_PROMPT
        .replace("{previous_summary}", &summary)
        .replace("{remaining_data}", &pretty_or(remaining, "None"))
        .replace(
            "{deleted_ids}",
            &serde_json::to_string(deleted_ids).unwrap_or_else(|_| "[]".to_string()),
        )
}

pub fn summarize_prompt(session_name: &str, entities: &[Value]) -> String {
    let name = if session_name.is_empty() {
        "None"
    } else {
        session_name
    };
    SUMMARIZE_PROMPT
        .replace("{session_name}", name)
        .replace("{entities_data}", &pretty_or(entities, "None"))
}
