//! Static support directory, crisis contacts and fun facts.

use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    Hotline,
    Website,
    Article,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceCategory {
    Crisis,
    General,
    Therapy,
    SelfHelp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    pub category: ResourceCategory,
}

const fn hotline(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    phone: &'static str,
    category: ResourceCategory,
) -> Resource {
    Resource {
        id,
        title,
        description,
        kind: ResourceType::Hotline,
        url: None,
        phone: Some(phone),
        category,
    }
}

const fn website(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    url: &'static str,
    category: ResourceCategory,
) -> Resource {
    Resource {
        id,
        title,
        description,
        kind: ResourceType::Website,
        url: Some(url),
        phone: None,
        category,
    }
}

pub const RESOURCES: [Resource; 10] = [
    hotline(
        "crisis-1",
        "988 Suicide & Crisis Lifeline",
        "24/7 free and confidential support for people in distress",
        "988",
        ResourceCategory::Crisis,
    ),
    hotline(
        "crisis-2",
        "Crisis Text Line",
        "Text HOME to 741741 - Free 24/7 support",
        "741741",
        ResourceCategory::Crisis,
    ),
    hotline(
        "crisis-3",
        "The Trevor Project",
        "LGBTQ+ youth crisis support - Call, text, or chat 24/7",
        "1-866-488-7386",
        ResourceCategory::Crisis,
    ),
    hotline(
        "crisis-4",
        "RAINN (Rape, Abuse & Incest National Network)",
        "Support for survivors of sexual assault - 24/7",
        "1-800-656-4673",
        ResourceCategory::Crisis,
    ),
    hotline(
        "general-1",
        "Teen Line",
        "Teens helping teens. Call or text for peer support",
        "1-800-852-8336",
        ResourceCategory::General,
    ),
    hotline(
        "general-2",
        "SAMHSA National Helpline",
        "Free, confidential mental health and substance abuse referrals",
        "1-800-662-4357",
        ResourceCategory::General,
    ),
    hotline(
        "general-3",
        "National Eating Disorders Association",
        "Support for eating disorders and body image concerns",
        "1-800-931-2237",
        ResourceCategory::General,
    ),
    website(
        "website-1",
        "Psychology Today - Find a Therapist",
        "Search for therapists in your area",
        "https://www.psychologytoday.com/us/therapists/adolescents",
        ResourceCategory::Therapy,
    ),
    website(
        "website-2",
        "HelpGuide.org",
        "Free mental health and wellness resources",
        "https://www.helpguide.org",
        ResourceCategory::SelfHelp,
    ),
    website(
        "website-3",
        "Cleveland Clinic - Understanding Stress",
        "Comprehensive guide to understanding and managing stress",
        "https://my.clevelandclinic.org/health/diseases/11874-stress",
        ResourceCategory::SelfHelp,
    ),
];

pub fn resources_in(category: ResourceCategory) -> impl Iterator<Item = &'static Resource> {
    RESOURCES.iter().filter(move |r| r.category == category)
}

/// Quick-dial contacts shown by the crisis button.
#[derive(Debug, Clone, Serialize)]
pub struct CrisisContact {
    pub name: &'static str,
    pub number: &'static str,
    pub description: &'static str,
}

pub const CRISIS_CONTACTS: [CrisisContact; 3] = [
    CrisisContact {
        name: "988 Lifeline",
        number: "988",
        description: "Suicide & Crisis Lifeline",
    },
    CrisisContact {
        name: "Crisis Text",
        number: "741741",
        description: "Text HOME to 741741",
    },
    CrisisContact {
        name: "Trevor Project",
        number: "1-866-488-7386",
        description: "LGBTQ+ Youth Support",
    },
];

pub const FUN_FACTS: [&str; 8] = [
    "Your brain doesn't finish developing until you're about 25 years old. The teenage years are crucial for building healthy habits!",
    "Laughing for 10-15 minutes can burn up to 40 calories and boost your mood instantly.",
    "Listening to music you love releases dopamine, the same 'feel-good' chemical released when you eat your favorite food.",
    "Spending time in nature for just 20 minutes can significantly reduce stress hormones.",
    "Writing down three things you're grateful for each day can improve your overall happiness by 25%.",
    "Getting 8-10 hours of sleep improves memory, mood, and even athletic performance.",
    "Exercise doesn't just help your body - it's one of the most effective treatments for anxiety and depression.",
    "Talking to someone you trust about your feelings can literally reduce the physical stress response in your body.",
];

pub fn random_fun_fact() -> &'static str {
    FUN_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FUN_FACTS[0])
}
