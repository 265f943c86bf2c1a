//! ボードのテキスト表示（CLI用）

use oapp_common::{Item, Lane, Link, Order, Record};
use std::fmt::Write;

/// カードとして表示できるレコード
pub trait Card: Record {
    fn title(&self) -> String;
    fn meta(&self) -> Vec<String>;
}

impl Card for Order {
    fn title(&self) -> String {
        match &self.quantity {
            Some(q) => format!("{} ({})", self.subject, q),
            None => self.subject.clone(),
        }
    }

    fn meta(&self) -> Vec<String> {
        let mut meta = Vec::new();
        if let Some(p) = &self.producer {
            meta.push(format!("Prod: {}", p));
        }
        if let Some(a) = &self.author {
            meta.push(format!("Autor: {}", a));
        }
        meta
    }
}

impl Card for Item {
    fn title(&self) -> String {
        format!("{} [{}]", self.description, self.priority)
    }

    fn meta(&self) -> Vec<String> {
        let mut meta = Vec::new();
        if let Some(d) = &self.response_deadline {
            meta.push(format!("Termin: {}", d));
        }
        if let Some(a) = &self.author {
            meta.push(format!("Autor: {}", a));
        }
        if let Some(answer) = &self.answer {
            meta.push(format!("Odp: {}", answer));
        }
        meta
    }
}

/// レーンごとにカードを並べる
pub fn render_board<R: Card>(records: &[R]) -> String {
    let mut out = String::new();
    for lane in Lane::ALL {
        let cards: Vec<&R> = records.iter().filter(|r| r.status() == lane).collect();
        let _ = writeln!(out, "== {} ({}) ==", lane, cards.len());
        for card in cards {
            let marker = if card.is_local_pending() { "*" } else { " " };
            let _ = writeln!(out, " {}[{}] {}", marker, card.id(), card.title());
            let meta = card.meta();
            if !meta.is_empty() {
                let _ = writeln!(out, "      {}", meta.join(" | "));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_links(links: &[Link]) -> String {
    if links.is_empty() {
        return "(brak linków)\n".to_string();
    }
    let mut out = String::new();
    for link in links {
        let _ = writeln!(out, "[{}] {} - {}", link.id, link.title, link.url);
    }
    out
}
