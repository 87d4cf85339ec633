// Declarative field tables for the profile summary.
// A field renders as "label: value" and is skipped when its extractor yields nothing.

use curable_persist::{Medication, MentalHealthAssessment, MetricRating, Onboarding, WeeklyCheckin};

pub struct FieldDescriptor<T> {
    pub label: &'static str,
    pub extract: fn(&T) -> Option<String>,
}

impl<T> FieldDescriptor<T> {
    pub fn render(&self, record: &T) -> Option<String> {
        (self.extract)(record)
            .filter(|value| !value.trim().is_empty())
            .map(|value| format!("{}: {}", self.label, value))
    }
}

/// Rendered fields of `record`, in table order
pub fn render_fields<T>(fields: &[FieldDescriptor<T>], record: &T) -> Vec<String> {
    fields.iter().filter_map(|field| field.render(record)).collect()
}

fn yes_no(value: Option<bool>) -> Option<String> {
    value.map(|v| if v { "yes" } else { "no" }.to_string())
}

fn list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

fn number(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{}", v))
}

/// "7/10 (notes)", "7/10" or just the notes
pub fn rating(metric: &MetricRating) -> Option<String> {
    let notes = metric.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
    match (metric.rating, notes) {
        (Some(r), Some(n)) => Some(format!("{}/10 ({})", r, n)),
        (Some(r), None) => Some(format!("{}/10", r)),
        (None, Some(n)) => Some(n.to_string()),
        (None, None) => None,
    }
}

pub const DEMOGRAPHIC_FIELDS: &[FieldDescriptor<Onboarding>] = &[
    FieldDescriptor { label: "Name", extract: |o| o.full_name.clone() },
    FieldDescriptor { label: "Date of birth", extract: |o| o.date_of_birth.map(|d| d.to_string()) },
    FieldDescriptor { label: "Gender", extract: |o| o.gender.clone() },
    FieldDescriptor { label: "Height (cm)", extract: |o| number(o.height_cm) },
    FieldDescriptor { label: "Weight (kg)", extract: |o| number(o.weight_kg) },
    FieldDescriptor { label: "BMI", extract: |o| number(o.bmi) },
    FieldDescriptor { label: "Blood group", extract: |o| o.blood_group.clone() },
    FieldDescriptor { label: "Chronic conditions", extract: |o| list(&o.chronic_conditions) },
    FieldDescriptor { label: "Long-term medications", extract: |o| list(&o.long_term_medications) },
    FieldDescriptor { label: "Family history", extract: |o| list(&o.family_history) },
    FieldDescriptor { label: "Smoker", extract: |o| yes_no(o.smoker) },
    FieldDescriptor { label: "Drinks alcohol", extract: |o| yes_no(o.alcohol_drinker) },
    FieldDescriptor { label: "Location", extract: |o| o.location.clone() },
];

pub const CHECKIN_FIELDS: &[FieldDescriptor<WeeklyCheckin>] = &[
    FieldDescriptor { label: "sleep hours", extract: |c| number(c.average_sleep_hours) },
    FieldDescriptor {
        label: "exercise per week",
        extract: |c| c.exercise_frequency_per_week.map(|n| format!("{}x", n)),
    },
    FieldDescriptor { label: "sleep quality", extract: |c| rating(&c.sleep_quality) },
    FieldDescriptor { label: "energy", extract: |c| rating(&c.energy) },
    FieldDescriptor { label: "stress", extract: |c| rating(&c.stress) },
    FieldDescriptor { label: "mood", extract: |c| rating(&c.mood) },
    FieldDescriptor { label: "lifestyle changes", extract: |c| c.lifestyle_changes.clone() },
];

pub const MENTAL_HEALTH_FIELDS: &[FieldDescriptor<MentalHealthAssessment>] = &[
    FieldDescriptor { label: "feeling", extract: |m| m.feeling_today.clone() },
    FieldDescriptor { label: "mood", extract: |m| m.mood_score.map(|s| format!("{}/10", s)) },
    FieldDescriptor {
        label: "overwhelmed by stress/anxiety",
        extract: |m| match (m.stress_anxiety_overwhelm, m.stress_anxiety_details.as_deref()) {
            (Some(true), Some(details)) if !details.trim().is_empty() => Some(format!("yes ({})", details.trim())),
            (flag, _) => yes_no(flag),
        },
    },
    FieldDescriptor {
        label: "thought heaviness",
        extract: |m| m.thought_heaviness_scale.map(|s| format!("{}/10", s)),
    },
    FieldDescriptor { label: "sleep changes", extract: |m| m.sleep_changes.clone() },
    FieldDescriptor {
        label: "hopelessness or loss of interest",
        extract: |m| match (m.hopelessness_loss_interest, m.hopelessness_explanation.as_deref()) {
            (Some(true), Some(details)) if !details.trim().is_empty() => Some(format!("yes ({})", details.trim())),
            (flag, _) => yes_no(flag),
        },
    },
    FieldDescriptor { label: "has support person", extract: |m| yes_no(m.has_support_person) },
    FieldDescriptor {
        label: "flagged urgent",
        extract: |m| m.is_flagged_urgent.filter(|urgent| *urgent).map(|_| "yes".to_string()),
    },
];

pub const MEDICATION_FIELDS: &[FieldDescriptor<Medication>] = &[
    FieldDescriptor { label: "dosage", extract: |m| m.dosage.clone() },
    FieldDescriptor { label: "frequency", extract: |m| m.frequency.clone() },
    FieldDescriptor {
        label: "prescribed",
        extract: |m| yes_no(m.is_prescribed),
    },
    FieldDescriptor { label: "notes", extract: |m| m.notes.clone() },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut onboarding = Onboarding::new("u1");
        onboarding.full_name = Some("Ada Obi".to_string());
        onboarding.blood_group = Some("   ".to_string());
        onboarding.smoker = Some(false);

        assert_eq!(
            render_fields(DEMOGRAPHIC_FIELDS, &onboarding),
            vec!["Name: Ada Obi".to_string(), "Smoker: no".to_string()]
        );
    }

    #[test]
    fn test_rating_with_and_without_notes() {
        assert_eq!(rating(&MetricRating::rated(4)).as_deref(), Some("4/10"));
        assert_eq!(
            rating(&MetricRating::rated(8).with_notes("deadlines")).as_deref(),
            Some("8/10 (deadlines)")
        );
        assert_eq!(rating(&MetricRating::default()), None);
    }

    #[test]
    fn test_overwhelm_details_attached() {
        let mut assessment = MentalHealthAssessment::default();
        assessment.stress_anxiety_overwhelm = Some(true);
        assessment.stress_anxiety_details = Some("exams".to_string());

        assert_eq!(
            render_fields(MENTAL_HEALTH_FIELDS, &assessment),
            vec!["overwhelmed by stress/anxiety: yes (exams)".to_string()]
        );
    }
}
