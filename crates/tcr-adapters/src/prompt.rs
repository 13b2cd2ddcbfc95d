//! Prompt and schema construction
//!
//! Prompts carry the jurisdiction, the response language and the three
//! extraction rules: leave unknown fields blank, ask about conflicts, flag
//! unreadable documents with the reserved `document_quality` field.

use crate::error::AdapterError;
use crate::service::{ClarificationRequest, ExtractionRequest, SynthesisRequest};
use serde_json::{json, Value};
use std::fmt::Write as _;
use tcr_model::{PerDriver, DOCUMENT_QUALITY_FIELD};

/// Extraction prompt listing evidence groups by file name
#[must_use]
pub fn extraction_prompt(request: &ExtractionRequest) -> String {
    let mut prompt = format!(
        "CONTEXT:\n\
         - Country Profile: {locale}\n\
         - Language for response: {language}\n\
         - You are an AI assistant processing an accident report. Your goal is to extract information from the provided media and fill a JSON object.\n\
         - Be accurate. If you cannot find information, leave the field blank in the JSON. Do not guess.\n\
         - If you find conflicting information (e.g., photo shows rear damage, but audio says front), populate your best estimate and create a question about it.\n\
         - Crucial: If a document image (license, registration, policy) is blurry, dark, or unreadable, create a question with the field set to '{quality}' and explain the issue in the question.\n\
         \nMEDIA INPUTS:",
        locale = request.locale,
        language = request.language,
        quality = DOCUMENT_QUALITY_FIELD,
    );

    for (group, items) in request.evidence_groups.non_empty() {
        let names: Vec<&str> = items.iter().map(|e| e.file_name.as_str()).collect();
        let _ = write!(prompt, "\n- {}: {}", group.instruction(), names.join(", "));
    }
    if let Some(geo) = request.geolocation {
        let _ = write!(
            prompt,
            "\n- USER'S CURRENT LOCATION (Use to determine 'accident.geo.address'): Latitude: {}, Longitude: {}",
            geo.lat, geo.lng
        );
    }

    prompt.push_str(
        "\n\nTASK:\nPopulate the provided JSON schema with data extracted from the media. Return ONLY the valid JSON object.",
    );
    prompt
}

/// Response schema for extraction
#[must_use]
pub fn response_schema() -> Value {
    let string = |description: &str| json!({ "type": "STRING", "description": description });
    json!({
        "type": "OBJECT",
        "properties": {
            "accident": {
                "type": "OBJECT",
                "properties": {
                    "timestamp": string("ISO 8601 format date and time of the accident."),
                    "geo": {
                        "type": "OBJECT",
                        "properties": {
                            "address": string("Full address of the accident location.")
                        }
                    },
                    "weather": string("Weather conditions (e.g., Clear, Raining, Foggy)."),
                    "light": string("Light conditions (e.g., Daylight, Dark, Dusk).")
                }
            },
            "vehicles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": string("Vehicle identifier, either 'A' or 'B'."),
                        "plate": string("License plate number."),
                        "make_model": string("Make and model of the vehicle (e.g., Ford Focus)."),
                        "first_impact": string("Initial point of impact on the vehicle (e.g., Front Bumper)."),
                        "manoeuvre": string("What the vehicle was doing (e.g., Turning left, Parked).")
                    }
                }
            },
            "drivers": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "vehicle": string("The vehicle this driver was operating, 'A' or 'B'."),
                        "name": string("Driver's full name."),
                        "id_no": string("National ID or other identification number."),
                        "licence_no": string("Driving license number."),
                        "phone": string("Driver's phone number."),
                        "statement": string("A brief statement from the driver about the accident, transcribed from audio if provided.")
                    }
                }
            },
            "insurance": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "vehicle": string("The vehicle this policy belongs to, 'A' or 'B'."),
                        "company": string("Name of the insurance company."),
                        "policy_no": string("Insurance policy number.")
                    }
                }
            },
            "questions": {
                "type": "ARRAY",
                "description": "A list of questions for the user if information is missing, conflicting, or media is unreadable.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "field": string("The specific data field the question relates to, or 'document_quality' for unreadable documents."),
                        "question": string("The question to ask the user.")
                    }
                }
            }
        }
    })
}

/// Vector diagram prompt
#[must_use]
pub fn diagram_prompt(request: &SynthesisRequest) -> String {
    format!(
        "Based on the following information, create a simple, schematic SVG diagram of the accident scene.\n\
         - Scene Photos: Use the provided images to understand the road layout and final positions of the vehicles.\n\
         - Vehicle A Manoeuvre: {}\n\
         - Vehicle B Manoeuvre: {}\n\
         - First Impact Points: Vehicle A - {}, Vehicle B - {}\n\
         \nTASK:\n\
         Return ONLY a valid SVG string. The SVG should be 400x300. Use a dark gray background (#334155).\n\
         - Roads should be a lighter gray.\n\
         - Vehicle A should be a cyan rectangle.\n\
         - Vehicle B should be an indigo rectangle.\n\
         - IMPORTANT: Wrap each vehicle in a group with a specific ID for interactivity: <g id=\"vehicle-A\">...</g> and <g id=\"vehicle-B\">...</g>.",
        request.maneuver_a, request.maneuver_b, request.impact_a, request.impact_b
    )
}

/// Raster sketch prompt
#[must_use]
pub fn sketch_prompt(request: &SynthesisRequest) -> String {
    format!(
        "Create a simple, black and white, top-down schematic sketch of a traffic accident based on this information:\n\
         - Vehicle A was {}.\n\
         - Vehicle B was {}.\n\
         - The impact for Vehicle A was on the {}.\n\
         - The impact for Vehicle B was on the {}.\n\
         - Use the provided scene photos to inform the road layout.\n\
         - Label the vehicles 'A' and 'B'.",
        request.maneuver_a, request.maneuver_b, request.impact_a, request.impact_b
    )
}

/// Clarification prompt
///
/// The record is serialized without the raster sketch and signatures.
///
/// # Errors
/// `AdapterError::Malformed` if the record cannot be serialized
pub fn clarification_prompt(request: &ClarificationRequest) -> Result<String, AdapterError> {
    let mut record = request.record.clone();
    record.diagram.sketch_base64 = None;
    record.signatures = PerDriver::default();
    let current = serde_json::to_string_pretty(&record)?;

    let questions: Vec<&str> = request
        .questions
        .iter()
        .map(|q| q.question.as_str())
        .collect();

    Ok(format!(
        "CONTEXT: You are an AI assistant helping a user finalize an accident report. The user is answering your previous questions to fill in missing information.\n\
         \nCURRENT REPORT DATA (JSON):\n```json\n{current}\n```\n\
         \nYOUR PREVIOUS QUESTIONS FOR THE USER:\n- {questions}\n\
         \nUSER'S ANSWER:\n\"\"\"\n{answer}\n\"\"\"\n\
         \nTASK:\n\
         Based ONLY on the user's answer, update the CURRENT REPORT DATA. Do not change any existing data unless the user's answer explicitly corrects it. Fill in only the missing fields mentioned in the user's answer. Return the complete, updated JSON object for the entire report. Return ONLY the JSON object, without any extra text or markdown.",
        questions = questions.join("\n- "),
        answer = request.answer,
    ))
}
