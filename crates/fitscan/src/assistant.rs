//! Scripted health assistant: ordered keyword rules over canned replies.
//!
//! The first rule with any keyword contained in the lower-cased message wins, so rule
//! order matters ("heart" must not shadow the results rule, greetings come first).

struct Rule {
    keywords: &'static [&'static str],
    reply: &'static str,
}

const GREETING: &str = "Hello! I'm your FitScan Health Assistant.\n\nI can help you with:\n\
- Choosing health assessments\n- Understanding symptoms\n- Explaining test results\n\
- General health questions\n\nWhat would you like to know?";

const FALLBACK: &str = "I understand you're asking about health topics. While I can help with \
FitScan assessments and general health information, for specific medical advice, please consult \
healthcare professionals.\n\nI can help you:\n- Choose the right health assessment\n\
- Understand symptoms\n- Explain how our tests work\n- Guide you through the platform\n\n\
What specific question do you have?";

const RULES: &[Rule] = &[
    Rule {
        keywords: &["hello", "hi", "hey"],
        reply: "Hello! Welcome to FitScan Health. I'm here to help you with health assessments \
and medical questions. What can I assist you with today?",
    },
    Rule {
        keywords: &["which test", "what assessment"],
        reply: "I can help you choose the right assessment! Here are our popular tests:\n\n\
- Heart Disease Risk - for chest pain, shortness of breath\n\
- Anxiety Assessment - for worry, nervousness, panic\n\
- COVID-19 Checker - for fever, cough, loss of taste/smell\n\
- Asthma Checker - for wheezing, breathing problems\n\
- Diabetes Risk - for increased thirst, fatigue\n\nWhat symptoms are you experiencing?",
    },
    Rule {
        keywords: &["chest pain", "heart"],
        reply: "For chest pain or heart-related symptoms, I recommend our Heart Disease Risk \
Assessment. It evaluates symptoms like chest discomfort, shortness of breath, and cardiovascular \
risk factors. Would you like me to guide you to this test?",
    },
    Rule {
        keywords: &["anxiety", "worry", "nervous"],
        reply: "Our Anxiety Assessment can help evaluate worry, nervousness, and anxiety symptoms. \
It takes 6-8 minutes and covers key areas including panic attacks, sleep problems, and \
concentration issues. Shall I direct you to this assessment?",
    },
    Rule {
        keywords: &["covid", "fever", "cough"],
        reply: "The COVID-19 Symptom Checker evaluates symptoms like fever, cough, loss of \
taste/smell, fatigue, and breathing difficulties. It helps assess your risk level and provides \
guidance on testing and isolation. Would you like to take this assessment?",
    },
    Rule {
        keywords: &["breathing", "asthma", "wheezing"],
        reply: "Our Asthma Symptom Checker is perfect for breathing issues! It evaluates wheezing, \
persistent cough, chest tightness, and exercise limitations. This assessment can help identify \
if you might have asthma or other respiratory conditions.",
    },
    Rule {
        keywords: &["diabetes", "thirst", "urination"],
        reply: "The Diabetes Risk Assessment evaluates symptoms like increased thirst, frequent \
urination, fatigue, and risk factors including age and family history. It's an important \
screening tool for early detection.",
    },
    Rule {
        keywords: &["results", "score", "risk level"],
        reply: "FitScan results show three risk levels:\n\n\
LOW RISK (0-39%) - Few symptoms, maintain healthy habits\n\
MODERATE RISK (40-69%) - Some concerning symptoms, consider medical consultation\n\
HIGH RISK (70-100%) - Significant symptoms, seek medical attention promptly\n\n\
Each result includes personalized recommendations and can be printed as a report.",
    },
    Rule {
        keywords: &["accurate", "reliable", "trust"],
        reply: "FitScan assessments are screening questionnaires based on common clinical \
symptom lists. They should not replace professional medical advice - always consult \
healthcare providers for medical decisions.",
    },
    Rule {
        keywords: &["print", "report", "pdf"],
        reply: "Yes! You can print your results as a report. When you print, we'll ask for \
patient details (name, age, sex, contact number, date of birth) and generate a report \
including:\n- Patient information\n- Assessment responses\n- Risk analysis\n\
- Recommendations\n- Medical disclaimers\n\nUseful for sharing with healthcare providers!",
    },
    Rule {
        keywords: &["emergency", "urgent", "severe pain"],
        reply: "IMPORTANT: If you're experiencing a medical emergency, call emergency services \
immediately.\n\nOur assessments are for informational purposes only and cannot replace \
emergency medical care. For severe symptoms, chest pain, difficulty breathing, or other \
urgent conditions, seek immediate medical attention.",
    },
    Rule {
        keywords: &["help", "how to", "guide"],
        reply: "I can help you with:\n\n- Choosing the right health assessment\n\
- Understanding symptoms and conditions\n- Interpreting your results\n\
- Printing reports\n- General health questions\n- Finding appropriate medical care\n\n\
Just ask me anything about health assessments or FitScan features!",
    },
    Rule {
        keywords: &["thank"],
        reply: "You're very welcome! Your health is important, and I'm glad I could help. If you \
have any other questions about FitScan assessments or health topics, feel free to ask anytime. \
Take care!",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthAssistant;

impl HealthAssistant {
    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    /// Canned reply for `message`; `None` for blank input.
    pub fn reply(&self, message: &str) -> Option<&'static str> {
        let message = message.trim().to_lowercase();
        if message.is_empty() {
            return None;
        }

        let reply = RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| message.contains(keyword)))
            .map(|rule| rule.reply)
            .unwrap_or(FALLBACK);
        Some(reply)
    }
}
