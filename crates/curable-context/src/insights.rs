//! Threshold rules turning numeric health fields into short insight phrases.

use curable_persist::{MentalHealthAssessment, MetricRating, WeeklyCheckin};

use crate::records::PatientRecords;

/// A rating at or below this is flagged
pub const LOW_RATING_THRESHOLD: u8 = 3;

/// A rating at or above this is flagged
pub const HIGH_RATING_THRESHOLD: u8 = 8;

/// Minimum change between the two latest check-ins reported as a trend
pub const TREND_DELTA_THRESHOLD: u8 = 3;

/// Average nightly sleep below this many hours is flagged
pub const SHORT_SLEEP_HOURS: f64 = 6.0;

/// Mood scores at or below this are flagged
pub const LOW_MOOD_SCORE: u8 = 3;

pub const GENERIC_GREETING: &str =
    "Hi! I'm Curable, your health companion. How are you feeling today?";

pub const FOLLOW_UP_QUESTION: &str = "Would you like to talk about how this has been affecting you?";

/// Rated check-in metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    SleepQuality,
    Energy,
    Stress,
    Mood,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::SleepQuality, Metric::Energy, Metric::Stress, Metric::Mood];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SleepQuality => "sleep quality",
            Self::Energy => "energy",
            Self::Stress => "stress",
            Self::Mood => "mood",
        }
    }

    pub fn of<'a>(&self, checkin: &'a WeeklyCheckin) -> &'a MetricRating {
        match self {
            Self::SleepQuality => &checkin.sleep_quality,
            Self::Energy => &checkin.energy,
            Self::Stress => &checkin.stress,
            Self::Mood => &checkin.mood,
        }
    }
}

/// Phrase for a change of at least `TREND_DELTA_THRESHOLD` between two check-ins
pub fn trend_phrase(metric: Metric, latest: &WeeklyCheckin, previous: &WeeklyCheckin) -> Option<String> {
    let now = metric.of(latest).rating?;
    let before = metric.of(previous).rating?;

    if now.abs_diff(before) < TREND_DELTA_THRESHOLD {
        return None;
    }

    let direction = if now > before { "rose" } else { "dropped" };
    Some(format!(
        "{} {} from {} to {} since your last check-in",
        metric.label(),
        direction,
        before,
        now
    ))
}

fn rating_phrase(metric: Metric, checkin: &WeeklyCheckin) -> Option<String> {
    let rating = metric.of(checkin).rating?;
    if rating <= LOW_RATING_THRESHOLD {
        Some(format!("your {} rating was low at {}/10", metric.label(), rating))
    } else if rating >= HIGH_RATING_THRESHOLD {
        Some(format!("your {} rating was high at {}/10", metric.label(), rating))
    } else {
        None
    }
}

fn mental_health_signals(assessment: &MentalHealthAssessment) -> Vec<String> {
    let mut phrases = Vec::new();
    if let Some(score) = assessment.mood_score.filter(|s| *s <= LOW_MOOD_SCORE) {
        phrases.push(format!("your mood score was {}/10", score));
    }
    if assessment.stress_anxiety_overwhelm == Some(true) {
        phrases.push("you have been feeling overwhelmed by stress or anxiety".to_string());
    }
    phrases
}

/// Insight phrases for the user's records, most pressing first:
/// urgent mental-health flags, trends, flagged ratings, short sleep, then
/// remaining mental-health signals.
pub fn derive_insights(records: &PatientRecords) -> Vec<String> {
    let mut insights = Vec::new();
    let mental = records.latest_mental_health();
    if mental.is_some_and(|m| m.is_flagged_urgent == Some(true)) {
        insights.push("your last mental health check-in was flagged as urgent".to_string());
    }

    if let Some(latest) = records.latest_checkin() {
        if let Some(previous) = records.previous_checkin() {
            insights.extend(
                Metric::ALL
                    .iter()
                    .filter_map(|metric| trend_phrase(*metric, latest, previous)),
            );
        }

        insights.extend(Metric::ALL.iter().filter_map(|metric| rating_phrase(*metric, latest)));

        if let Some(hours) = latest.average_sleep_hours.filter(|h| *h < SHORT_SLEEP_HOURS) {
            insights.push(format!("you have been averaging only {} hours of sleep", hours));
        }
    }

    if let Some(assessment) = mental {
        insights.extend(mental_health_signals(assessment));
    }
    insights
}

/// Opening message built from the first one or two insights
pub fn build_greeting(insights: &[String]) -> String {
    match insights {
        [] => GENERIC_GREETING.to_string(),
        [only] => format!("Hi! I noticed that {}. {}", only, FOLLOW_UP_QUESTION),
        [first, second, ..] => format!(
            "Hi! I noticed that {} and that {}. {}",
            first, second, FOLLOW_UP_QUESTION
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn checkin(stress: u8, energy: u8, days_ago: i64) -> WeeklyCheckin {
        let mut checkin = WeeklyCheckin::new("u1", Utc::now() - Duration::days(days_ago));
        checkin.stress = MetricRating::rated(stress);
        checkin.energy = MetricRating::rated(energy);
        checkin
    }

    #[test]
    fn test_trend_names_both_values_and_direction() {
        let previous = checkin(3, 8, 7);
        let latest = checkin(8, 4, 0);

        assert_eq!(
            trend_phrase(Metric::Stress, &latest, &previous).as_deref(),
            Some("stress rose from 3 to 8 since your last check-in")
        );
        assert_eq!(
            trend_phrase(Metric::Energy, &latest, &previous).as_deref(),
            Some("energy dropped from 8 to 4 since your last check-in")
        );
    }

    #[test]
    fn test_change_below_threshold_is_not_a_trend() {
        let previous = checkin(5, 5, 7);
        let latest = checkin(7, 3, 0);

        assert!(trend_phrase(Metric::Stress, &latest, &previous).is_none());
        assert!(trend_phrase(Metric::Energy, &latest, &previous).is_none());
    }

    #[test]
    fn test_change_exactly_at_threshold_is_a_trend() {
        let previous = checkin(4, 5, 7);
        let latest = checkin(7, 5, 0);
        assert!(trend_phrase(Metric::Stress, &latest, &previous).is_some());
    }

    #[test]
    fn test_missing_rating_yields_no_trend() {
        let previous = WeeklyCheckin::new("u1", Utc::now() - Duration::days(7));
        let latest = checkin(9, 5, 0);
        assert!(trend_phrase(Metric::Stress, &latest, &previous).is_none());
    }

    #[test]
    fn test_threshold_ratings_flagged() {
        let records = PatientRecords {
            checkins: vec![checkin(3, 8, 0)],
            ..Default::default()
        };

        assert_eq!(
            derive_insights(&records),
            vec![
                "your energy rating was high at 8/10".to_string(),
                "your stress rating was low at 3/10".to_string(),
            ]
        );
    }

    #[test]
    fn test_urgent_mental_health_comes_first() {
        let mut assessment = MentalHealthAssessment::new("u1", Utc::now());
        assessment.is_flagged_urgent = Some(true);
        assessment.mood_score = Some(2);

        let records = PatientRecords {
            checkins: vec![checkin(9, 5, 0)],
            mental_health: vec![assessment],
            ..Default::default()
        };

        let insights = derive_insights(&records);
        assert_eq!(insights[0], "your last mental health check-in was flagged as urgent");
        assert_eq!(insights[1], "your stress rating was high at 9/10");
        assert_eq!(insights[2], "your mood score was 2/10");
    }

    #[test]
    fn test_short_sleep_flagged() {
        let mut latest = checkin(5, 5, 0);
        latest.average_sleep_hours = Some(5.5);
        let records = PatientRecords {
            checkins: vec![latest],
            ..Default::default()
        };

        assert_eq!(
            derive_insights(&records),
            vec!["you have been averaging only 5.5 hours of sleep".to_string()]
        );
    }

    #[test]
    fn test_greeting_uses_at_most_two_insights() {
        assert_eq!(build_greeting(&[]), GENERIC_GREETING);

        let insights = vec![
            "stress rose from 3 to 8 since your last check-in".to_string(),
            "your energy rating was low at 2/10".to_string(),
            "your mood score was 3/10".to_string(),
        ];
        let greeting = build_greeting(&insights);
        assert!(greeting.starts_with("Hi! I noticed that stress rose from 3 to 8"));
        assert!(greeting.contains("and that your energy rating was low at 2/10"));
        assert!(!greeting.contains("mood score"));
        assert!(greeting.ends_with(FOLLOW_UP_QUESTION));
    }
}
