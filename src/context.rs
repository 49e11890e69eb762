//! Customer-support session state shared by tools, guardrail and agents

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Structured output of the sentiment guardrail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    pub is_negative: bool,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub status: String,
    pub eta: String,
    pub carrier: Option<String>,
}

impl Order {
    pub fn new(status: impl Into<String>, eta: impl Into<String>, carrier: Option<&str>) -> Self {
        Self {
            status: status.into(),
            eta: eta.into(),
            carrier: carrier.map(str::to_string),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | ETA: {} | Carrier: {}",
            self.status,
            self.eta,
            self.carrier.as_deref().unwrap_or("None")
        )
    }
}

/// FAQ keys are matched case-insensitively and ignoring surrounding whitespace
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct SupportContext {
    customer_id: String,
    faq_answers: HashMap<String, String>,
    orders: HashMap<String, Order>,
    pub last_guardrail_verdict: Option<GuardrailVerdict>,
}

impl SupportContext {
    /// Context with the stock FAQ table and demo orders
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self::with_data(customer_id, default_faq_answers(), default_orders())
    }

    pub fn with_data(
        customer_id: impl Into<String>,
        faq_answers: impl IntoIterator<Item = (String, String)>,
        orders: impl IntoIterator<Item = (String, Order)>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            faq_answers: faq_answers
                .into_iter()
                .map(|(q, a)| (normalize_question(&q), a))
                .collect(),
            orders: orders.into_iter().collect(),
            last_guardrail_verdict: None,
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn faq_answer(&self, question: &str) -> Option<&str> {
        self.faq_answers
            .get(&normalize_question(question))
            .map(String::as_str)
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn faq_count(&self) -> usize {
        self.faq_answers.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

fn default_faq_answers() -> Vec<(String, String)> {
    [
        ("what is your name?", "I am FAQBot 🤖, your helpful assistant!"),
        ("what can you do?", "I can answer predefined questions quickly and clearly."),
        ("how are you?", "I’m just code, but I’m doing great! 🚀"),
        ("who created you?", "I was created using the OpenAI Agent SDK + Gemini Flash 2.5."),
        ("what is chainlit?", "Chainlit is a framework to build beautiful UIs for LLM-powered apps."),
    ]
    .into_iter()
    .map(|(q, a)| (q.to_string(), a.to_string()))
    .collect()
}

fn default_orders() -> Vec<(String, Order)> {
    vec![
        ("ORD-1001".to_string(), Order::new("Shipped", "3-5 days", Some("DHL"))),
        ("ORD-1002".to_string(), Order::new("Processing", "TBD", None)),
    ]
}
