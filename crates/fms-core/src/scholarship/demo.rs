//! Fixed demonstration dataset.
//!
//! Shown only on explicit request and always labeled as demo data.

use super::model::Scholarship;

struct DemoEntry {
    id: &'static str,
    name: &'static str,
    provider: &'static str,
    deadline: &'static str,
    amount: &'static str,
    score: f64,
    reasons: &'static [&'static str],
    apply_link: &'static str,
    description: &'static str,
}

const DEMO_ENTRIES: &[DemoEntry] = &[
    DemoEntry {
        id: "nsp_minority_2024",
        name: "Post Matric Scholarship for Minorities",
        provider: "Ministry of Minority Affairs",
        deadline: "2024-12-31",
        amount: "₹20,000 per annum",
        score: 0.98,
        reasons: &["Income ≤ ₹2.5L", "Minority category", "Marks > 50%"],
        apply_link: "https://scholarships.gov.in",
        description: "Financial assistance for minority students pursuing higher education.",
    },
    DemoEntry {
        id: "mahadbt_obc_2024",
        name: "Government of India Post-Matric Scholarship",
        provider: "Government of Maharashtra",
        deadline: "2024-10-31",
        amount: "Tuition Fees + Exam Fees",
        score: 0.85,
        reasons: &["State = Maharashtra", "OBC category", "CAP Round Admission"],
        apply_link: "https://mahadbt.maharashtra.gov.in",
        description: "State scholarship for OBC students admitted via government quota.",
    },
    DemoEntry {
        id: "hdfc_badhte_kadam",
        name: "HDFC Badhte Kadam Scholarship",
        provider: "HDFC Bank",
        deadline: "2024-09-15",
        amount: "₹1,00,000",
        score: 0.72,
        reasons: &["Merit-based", "Annual Income < ₹6L"],
        apply_link: "https://www.hdfcbank.com",
        description: "Support for meritorious students from economically weaker sections.",
    },
    DemoEntry {
        id: "aicte_pragati",
        name: "AICTE Pragati Scholarship for Girls",
        provider: "AICTE",
        deadline: "2024-11-20",
        amount: "₹50,000 per annum",
        score: 0.67,
        reasons: &["Girl Child", "Technical Degree"],
        apply_link: "https://www.aicte-india.org/schemes/students-development-schemes/Pragati",
        description: "Encourages girl students to pursue technical education.",
    },
    DemoEntry {
        id: "tata_scholarship",
        name: "J N Tata Endowment Loan Scholarship",
        provider: "Tata Trusts",
        deadline: "2024-03-15",
        amount: "Varies",
        score: 0.55,
        reasons: &["Higher Studies Abroad", "Indian National"],
        apply_link: "https://www.tatatrusts.org",
        description: "Loan scholarship for higher studies abroad.",
    },
];

/// Returns the demonstration scholarships, already ranked by score.
pub fn demo_scholarships() -> Vec<Scholarship> {
    DEMO_ENTRIES
        .iter()
        .map(|e| Scholarship {
            scholarship_id: e.id.to_string(),
            name: e.name.to_string(),
            provider: e.provider.to_string(),
            deadline: e.deadline.to_string(),
            amount: e.amount.to_string(),
            score: e.score,
            reasons: e.reasons.iter().map(|r| r.to_string()).collect(),
            apply_link: e.apply_link.to_string(),
            description: Some(e.description.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_is_deterministic() {
        assert_eq!(demo_scholarships(), demo_scholarships());
    }

    #[test]
    fn test_demo_ranked_by_score() {
        let demo = demo_scholarships();
        assert!(!demo.is_empty());
        assert!(demo.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
