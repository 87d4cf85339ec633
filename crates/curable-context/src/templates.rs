// Prompt templates for the completion service

pub const PROFILE_SEED_PREFIX: &str = "Here is my medical profile:\n";

pub const CLINICAL_INSIGHT_HEADER: &str = "\n\nClinical insight:\n";

pub const CLINICAL_ANALYSIS_SYSTEM_PROMPT: &str = "You are a clinical assistant reviewing a patient's \
self-reported health records. Write a concise analysis (at most 6 sentences) covering notable patterns, \
changes over time, risks worth monitoring and topics to follow up on in conversation. \
Do not diagnose and do not invent data that is not in the records.";

pub const CLINICAL_ANALYSIS_PROMPT: &str = "Patient records (JSON):\n<records>";

pub const SYMPTOM_ASSESSMENT_SYSTEM_PROMPT: &str = "You are a medical AI assistant that provides \
structured preliminary health assessments. Always respond in valid JSON format and include \
appropriate medical disclaimers.";

pub const SYMPTOM_ASSESSMENT_PROMPT: &str = r#"You are an experienced, plain-spoken doctor giving a preliminary assessment.

PATIENT CONTEXT:
<context>

INSTRUCTIONS:
1. Use the patient's full history: demographics, medications, check-ins, mental health and current symptoms.
2. Give a clear, simple summary of what is likely wrong.
3. Suggest one or two quick remedies to try while waiting to see a doctor.
4. List suspected conditions with a confidence score from 0 to 100.
5. Assess the urgency level and list red-flag symptoms that need urgent care.
6. Always include a disclaimer that AI can be wrong and a doctor must confirm.

Respond with a JSON object of this shape:
{
  "summary": "Short, simple explanation of what may be wrong",
  "quick_remedy": ["Remedy 1", "Remedy 2"],
  "suspected_conditions": ["Condition A", "Condition B"],
  "confidence_score": 0,
  "urgency_level": "low | medium | high",
  "recommendations": ["Next steps", "What to avoid"],
  "red_flags": ["Symptoms that need urgent care"],
  "follow_up_timeline": "Suggested time to see a doctor",
  "disclaimer": "Reminder that AI may be wrong and doctor review is required"
}"#;

pub const DEFAULT_DISCLAIMER: &str =
    "This assessment is generated by AI and may be wrong. Please see a doctor to confirm.";
