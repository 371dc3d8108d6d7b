//! Static page content

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ: &[FaqEntry] = &[
    FaqEntry {
        question: "How long does a single ad run?",
        answer: "Each slot is 10 seconds and repeats in a loop of up to 6 advertisers, all day.",
    },
    FaqEntry {
        question: "What is the minimum campaign length?",
        answer: "One week. Campaigns start on any day.",
    },
    FaqEntry {
        question: "Can I show video?",
        answer: "Video screens accept MP4 (H.264) without sound. Static-only screens need a JPG or PNG.",
    },
    FaqEntry {
        question: "What does double-sided mean?",
        answer: "One installation with two faces pointing at opposite traffic. Each face is booked separately.",
    },
    FaqEntry {
        question: "Can I book a single viaduct screen?",
        answer: "No. Viaduct screens are sold only as a package covering all of them.",
    },
    FaqEntry {
        question: "What are last-minute offers?",
        answer: "Discounted free slots close to the start date. The offer ends on the date shown on the map.",
    },
    FaqEntry {
        question: "Do you produce the creative?",
        answer: "We can adapt existing material to every screen size listed in the clip requirements.",
    },
];
