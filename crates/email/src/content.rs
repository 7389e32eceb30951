//! Rendered email bodies for invitations and reminders.
//!
//! Quebec residential organizations default to French; recipients with a
//! known language preference get English when they ask for it.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    French,
    English,
}

impl Language {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "en" | "en-ca" | "en-us" => Language::English,
            _ => Language::French,
        }
    }
}

/// A rendered email: plain text plus an HTML alternative.
#[derive(Debug, Clone)]
pub struct EmailBody {
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct InvitationEmailParams {
    pub organization_name: String,
    pub inviter_name: String,
    pub role_label: String,
    pub accept_url: String,
    pub expires_at: DateTime<Utc>,
    pub personal_message: Option<String>,
    pub language: Language,
}

pub fn invitation_email(params: &InvitationEmailParams) -> EmailBody {
    match params.language {
        Language::French => invitation_fr(params),
        Language::English => invitation_en(params),
    }
}

fn invitation_fr(p: &InvitationEmailParams) -> EmailBody {
    let subject = format!("Invitation à rejoindre {} sur Habitek", p.organization_name);
    let expiry = p.expires_at.format("%d/%m/%Y");
    let message_block = p
        .personal_message
        .as_deref()
        .map(|m| format!("\nMessage de {} :\n« {} »\n", p.inviter_name, m))
        .unwrap_or_default();
    let text = format!(
        "Bonjour,\n\n{inviter} vous invite à rejoindre {org} sur Habitek en tant que {role}.\n{message}\nPour accepter l'invitation, cliquez sur le lien suivant :\n{url}\n\nCette invitation expire le {expiry}.\n\nL'équipe Habitek",
        inviter = p.inviter_name,
        org = p.organization_name,
        role = p.role_label,
        message = message_block,
        url = p.accept_url,
        expiry = expiry,
    );
    let message_html = p
        .personal_message
        .as_deref()
        .map(|m| {
            format!(
                "<blockquote>Message de {} : « {} »</blockquote>",
                escape_html(&p.inviter_name),
                escape_html(m)
            )
        })
        .unwrap_or_default();
    let html = format!(
        "<p>Bonjour,</p>\
         <p>{inviter} vous invite à rejoindre <strong>{org}</strong> sur Habitek en tant que {role}.</p>\
         {message}\
         <p><a href=\"{url}\">Accepter l'invitation</a></p>\
         <p>Cette invitation expire le {expiry}.</p>\
         <p>L'équipe Habitek</p>",
        inviter = escape_html(&p.inviter_name),
        org = escape_html(&p.organization_name),
        role = escape_html(&p.role_label),
        message = message_html,
        url = p.accept_url,
        expiry = expiry,
    );
    EmailBody { subject, text, html }
}

fn invitation_en(p: &InvitationEmailParams) -> EmailBody {
    let subject = format!("You're invited to join {} on Habitek", p.organization_name);
    let expiry = p.expires_at.format("%Y-%m-%d");
    let message_block = p
        .personal_message
        .as_deref()
        .map(|m| format!("\nMessage from {}:\n\"{}\"\n", p.inviter_name, m))
        .unwrap_or_default();
    let text = format!(
        "Hello,\n\n{inviter} has invited you to join {org} on Habitek as {role}.\n{message}\nTo accept the invitation, open the following link:\n{url}\n\nThis invitation expires on {expiry}.\n\nThe Habitek team",
        inviter = p.inviter_name,
        org = p.organization_name,
        role = p.role_label,
        message = message_block,
        url = p.accept_url,
        expiry = expiry,
    );
    let message_html = p
        .personal_message
        .as_deref()
        .map(|m| {
            format!(
                "<blockquote>Message from {}: \"{}\"</blockquote>",
                escape_html(&p.inviter_name),
                escape_html(m)
            )
        })
        .unwrap_or_default();
    let html = format!(
        "<p>Hello,</p>\
         <p>{inviter} has invited you to join <strong>{org}</strong> on Habitek as {role}.</p>\
         {message}\
         <p><a href=\"{url}\">Accept the invitation</a></p>\
         <p>This invitation expires on {expiry}.</p>\
         <p>The Habitek team</p>",
        inviter = escape_html(&p.inviter_name),
        org = escape_html(&p.organization_name),
        role = escape_html(&p.role_label),
        message = message_html,
        url = p.accept_url,
        expiry = expiry,
    );
    EmailBody { subject, text, html }
}

#[derive(Debug, Clone)]
pub struct ReminderEmailParams {
    pub organization_name: String,
    pub accept_url: String,
    pub unsubscribe_url: String,
    pub expires_at: DateTime<Utc>,
    pub language: Language,
}

pub fn reminder_email(p: &ReminderEmailParams) -> EmailBody {
    match p.language {
        Language::French => {
            let subject = format!("Rappel : votre invitation à {} expire bientôt", p.organization_name);
            let expiry = p.expires_at.format("%d/%m/%Y");
            let text = format!(
                "Bonjour,\n\nVotre invitation à rejoindre {org} sur Habitek expire le {expiry}.\n\nPour l'accepter :\n{url}\n\nPour ne plus recevoir de rappels :\n{unsub}\n\nL'équipe Habitek",
                org = p.organization_name,
                expiry = expiry,
                url = p.accept_url,
                unsub = p.unsubscribe_url,
            );
            let html = format!(
                "<p>Bonjour,</p>\
                 <p>Votre invitation à rejoindre <strong>{org}</strong> sur Habitek expire le {expiry}.</p>\
                 <p><a href=\"{url}\">Accepter l'invitation</a></p>\
                 <p><a href=\"{unsub}\">Ne plus recevoir de rappels</a></p>\
                 <p>L'équipe Habitek</p>",
                org = escape_html(&p.organization_name),
                expiry = expiry,
                url = p.accept_url,
                unsub = p.unsubscribe_url,
            );
            EmailBody { subject, text, html }
        }
        Language::English => {
            let subject = format!("Reminder: your invitation to {} expires soon", p.organization_name);
            let expiry = p.expires_at.format("%Y-%m-%d");
            let text = format!(
                "Hello,\n\nYour invitation to join {org} on Habitek expires on {expiry}.\n\nTo accept it:\n{url}\n\nTo stop receiving reminders:\n{unsub}\n\nThe Habitek team",
                org = p.organization_name,
                expiry = expiry,
                url = p.accept_url,
                unsub = p.unsubscribe_url,
            );
            let html = format!(
                "<p>Hello,</p>\
                 <p>Your invitation to join <strong>{org}</strong> on Habitek expires on {expiry}.</p>\
                 <p><a href=\"{url}\">Accept the invitation</a></p>\
                 <p><a href=\"{unsub}\">Stop receiving reminders</a></p>\
                 <p>The Habitek team</p>",
                org = escape_html(&p.organization_name),
                expiry = expiry,
                url = p.accept_url,
                unsub = p.unsubscribe_url,
            );
            EmailBody { subject, text, html }
        }
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
