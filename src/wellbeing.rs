//! Canned self-help content: tips, health notes, referrals, exercises.
//!
//! Lookups are case-insensitive; unknown keys get a short hint listing what is
//! available.

use rand::seq::SliceRandom;

const SELF_CARE_TIPS: &[&str] = &[
    "Remember to take short breaks throughout your study sessions.",
    "Stay hydrated by drinking plenty of water.",
    "Get at least 7-8 hours of sleep per night.",
    "Practice deep breathing exercises for a few minutes each day.",
    "Spend some time in nature to clear your mind.",
];

const MOTIVATIONAL_MESSAGES: &[&str] = &[
    "Every small step forward is still a step forward. Keep going!",
    "Believe in yourself and all that you are. Know that there is something inside you that is greater than any obstacle.",
    "Your potential is endless. Don't be afraid to take on new challenges and grow.",
    "The best way to predict the future is to create it.",
];

const HEALTH_INFO: &[(&str, &str)] = &[
    (
        "stress",
        "Stress is your body's reaction to a challenge or demand. It can be positive (e.g., meeting a deadline) or negative (e.g., chronic overwork). Symptoms include fatigue, headaches, irritability, and difficulty concentrating.",
    ),
    (
        "sleep",
        "Adequate sleep is crucial for physical and mental health. Most adults need 7-9 hours of sleep per night. Poor sleep can lead to mood swings, decreased cognitive function, and weakened immunity.",
    ),
    (
        "anxiety",
        "Anxiety is a feeling of worry, nervousness, or unease, typically about an event or something with an uncertain outcome. Symptoms include restlessness, fatigue, difficulty concentrating, and muscle tension.",
    ),
    (
        "lifestyle",
        "A healthy lifestyle involves balanced nutrition, regular physical activity, sufficient sleep, and stress management. These factors significantly impact your overall well-being.",
    ),
];

const HEALTH_INFO_UNKNOWN: &str = "I don't have specific information on that topic, but I can provide general health information on stress, sleep, anxiety, and lifestyle.";

const PROFESSIONAL_HELP: &[(&str, &str)] = &[
    (
        "counselor",
        "You can find counselors at your university's 'Student Counseling Center' or through local mental health services.",
    ),
    (
        "psychologist",
        "Licensed psychologists can be found through national psychological associations or by asking for a referral from a general practitioner.",
    ),
    (
        "doctor",
        "For any physical symptoms related to stress or anxiety, please consult your general practitioner or a family doctor.",
    ),
    (
        "helpline",
        "For immediate support, consider contacting a mental health helpline such as the National Suicide Prevention Lifeline (1-800-273-8255) or Crisis Text Line (text HOME to 741741).",
    ),
];

const PROFESSIONAL_HELP_UNKNOWN: &str = "I can direct you to resources for counselors, psychologists, doctors, or helplines. Which one are you interested in?";

const RELAXATION_EXERCISES: &[(&str, &str)] = &[
    (
        "breathing",
        "Try the 4-7-8 breathing technique: Breathe in for 4 counts, hold for 7, and exhale for 8. Repeat a few times.",
    ),
    (
        "mindfulness",
        "Find a quiet spot, focus on your breath, and observe any thoughts or sensations without judgment. Let them pass like clouds in the sky.",
    ),
];

const RELAXATION_UNKNOWN: &str =
    "I can guide you through breathing exercises or mindfulness exercises. Which would you prefer?";

const COPING_STRATEGIES: &[(&str, &str)] = &[
    (
        "exam stress",
        "Break down your study material into smaller, manageable chunks. Take regular breaks and reward yourself for progress. Remember to prioritize sleep and nutrition.",
    ),
    (
        "loneliness",
        "Reach out to a friend or family member. Join a club or a group with shared interests. Volunteering can also help you connect with others and find purpose.",
    ),
    (
        "anxiety",
        "Practice grounding techniques like identifying 5 things you can see, 4 things you can touch, 3 things you can hear, 2 things you can smell, and 1 thing you can taste.",
    ),
    (
        "general",
        "Engage in hobbies, exercise regularly, maintain a healthy diet, and ensure you get enough sleep. Talking to a trusted person can also be very helpful.",
    ),
];

const COPING_UNKNOWN: &str = "I can offer coping strategies for exam stress, loneliness, or general anxiety. What specific challenge are you facing?";

fn pick(options: &'static [&'static str]) -> &'static str {
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str, unknown: &'static str) -> &'static str {
    let key = key.trim().to_lowercase();
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
        .unwrap_or(unknown)
}

pub fn self_care_tip() -> &'static str {
    pick(SELF_CARE_TIPS)
}

pub fn motivational_message() -> &'static str {
    pick(MOTIVATIONAL_MESSAGES)
}

/// Topics: stress, sleep, anxiety, lifestyle.
pub fn health_info(topic: &str) -> &'static str {
    lookup(HEALTH_INFO, topic, HEALTH_INFO_UNKNOWN)
}

/// Kinds: counselor, psychologist, doctor, helpline.
pub fn professional_help(kind: &str) -> &'static str {
    lookup(PROFESSIONAL_HELP, kind, PROFESSIONAL_HELP_UNKNOWN)
}

/// Kinds: breathing, mindfulness.
pub fn relaxation_exercise(kind: &str) -> &'static str {
    lookup(RELAXATION_EXERCISES, kind, RELAXATION_UNKNOWN)
}

/// Issues: exam stress, loneliness, anxiety, general.
pub fn coping_strategy(issue: &str) -> &'static str {
    lookup(COPING_STRATEGIES, issue, COPING_UNKNOWN)
}
