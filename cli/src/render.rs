//! Plain-text rendering of backend records.
//!
//! Every string that came from the server passes through
//! `sanitize_display_text` before it reaches the terminal.

use staymate_realtime::RealtimeEvent;
use staymate_types::{
    ApplicationResponse, BookingResponse, ConversationResponse, DashboardStats, DocumentStatus,
    EarningsSummary, MessageResponse, NotificationResponse, PayoutRequest, PropertyResponse, Role,
    RoommatePost, User, VerificationStatus,
};
use staymate_utils::sanitize_display_text as clean;

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "tenant",
        Role::HouseOwner => "house owner",
        Role::Admin => "admin",
    }
}

pub fn user_summary(user: &User) -> String {
    let mut out = format!(
        "{} <{}> ({})",
        clean(&user.display_name()),
        clean(&user.email),
        role_label(user.primary_role())
    );
    if user.needs_role_selection() {
        out.push_str("\nNo role selected yet; run `staymate select-role`");
    }
    out
}

pub fn conversation_line(conversation: &ConversationResponse) -> String {
    let mut line = format!(
        "#{} {}",
        conversation.id,
        clean(&conversation.other_participant_name)
    );
    if let Some(title) = &conversation.property_title {
        line.push_str(&format!(" [{}]", clean(title)));
    }
    if conversation.unread_count > 0 {
        line.push_str(&format!(" ({} unread)", conversation.unread_count));
    }
    if let Some(last) = &conversation.last_message {
        line.push_str(&format!(": {}", clean(last)));
    }
    line
}

pub fn message_line(message: &MessageResponse) -> String {
    let sender = if message.is_own_message {
        "you".to_string()
    } else {
        clean(&message.sender_name)
    };
    format!(
        "[{}] {sender}: {}",
        clean(&message.created_at),
        clean(&message.content)
    )
}

pub fn notification_line(notification: &NotificationResponse) -> String {
    let marker = if notification.read { ' ' } else { '*' };
    format!(
        "{marker} #{} {}: {}",
        notification.id,
        clean(&notification.title),
        clean(&notification.message)
    )
}

pub fn property_line(property: &PropertyResponse) -> String {
    let location = property.location.as_deref().map(clean).unwrap_or_default();
    let price = match (&property.price, property.price_amount) {
        (Some(label), _) => clean(label),
        (None, Some(amount)) => format!("{amount:.2}"),
        (None, None) => "-".to_string(),
    };
    format!(
        "#{} {} | {location} | {price} | {} bd / {} ba",
        property.id,
        clean(&property.title),
        property.beds,
        property.baths
    )
}

pub fn booking_line(booking: &BookingResponse) -> String {
    let title = booking
        .property_title
        .as_deref()
        .map(clean)
        .unwrap_or_else(|| format!("property #{}", booking.property_id));
    format!(
        "#{} {title} {}..{} {}",
        booking.id, booking.start_date, booking.end_date, booking.status
    )
}

pub fn payout_line(payout: &PayoutRequest) -> String {
    let mut line = format!(
        "#{} {:.2} {}",
        payout.id,
        payout.amount,
        payout.status.as_str()
    );
    if let Some(created) = &payout.created_at {
        line.push_str(&format!(" {}", clean(created)));
    }
    if let Some(note) = &payout.admin_note {
        line.push_str(&format!(" ({})", clean(note)));
    }
    line
}

pub fn roommate_line(post: &RoommatePost) -> String {
    let who = post
        .user_name
        .as_deref()
        .map_or_else(|| "someone".to_string(), clean);
    let mut line = format!("{who} in {} up to {:.0}", clean(&post.location), post.budget);
    if let Some(id) = post.id {
        line = format!("#{id} {line}");
    }
    if let Some(score) = post.match_score {
        line.push_str(&format!(" [{score}% match]"));
    }
    line
}

pub fn application_line(application: &ApplicationResponse) -> String {
    let sender = application
        .sender_name
        .as_deref()
        .map_or_else(|| format!("user #{}", application.sender_id), clean);
    let mut line = format!("#{} {sender} {}", application.id, application.status);
    if let Some(title) = &application.property_title {
        line.push_str(&format!(" for {}", clean(title)));
    }
    line
}

fn check(done: bool) -> &'static str {
    if done { "yes" } else { "no" }
}

pub fn verification_summary(status: &VerificationStatus) -> String {
    let document = match status.document_status {
        DocumentStatus::NotUploaded => "not uploaded",
        DocumentStatus::Pending => "pending review",
        DocumentStatus::Approved => "approved",
        DocumentStatus::Rejected => "rejected",
        DocumentStatus::Unknown => "unknown",
    };
    let mut out = format!(
        "Email:    {}\nPhone:    {}\nProfile:  {}\nDocument: {document}",
        check(status.email_verified),
        check(status.phone_verified),
        check(status.profile_complete)
    );
    if let Some(reason) = &status.rejection_reason {
        out.push_str(&format!(" ({})", clean(reason)));
    }
    out
}

pub fn earnings_summary(summary: &EarningsSummary) -> String {
    format!(
        "Total earnings:    {:.2}\n\
         Available balance: {:.2}\n\
         Pending balance:   {:.2}\n\
         Commission:        {:.2}\n\
         Paid out:          {:.2}",
        summary.total_earnings,
        summary.available_balance,
        summary.pending_balance,
        summary.total_commission,
        summary.total_paid_out
    )
}

pub fn dashboard(stats: &DashboardStats) -> String {
    let mut lines: Vec<String> = stats
        .metrics
        .iter()
        .map(|metric| format!("{}: {}", clean(&metric.label), clean(&metric.value)))
        .collect();
    let counters = [
        ("Users", stats.total_users),
        ("Properties", stats.total_properties),
        ("Active bookings", stats.active_bookings),
        ("Pending bookings", stats.pending_bookings),
        ("Upcoming bookings", stats.upcoming_bookings),
    ];
    for (label, value) in counters {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    if let Some(unread) = stats.unread_messages_count {
        lines.push(format!("Unread messages: {unread}"));
    }
    if lines.is_empty() {
        lines.push("No dashboard data".to_string());
    }
    lines.join("\n")
}

/// One line for a streamed event, `None` for events not worth printing.
pub fn realtime_event(event: &RealtimeEvent) -> Option<String> {
    match event {
        RealtimeEvent::Connected => Some("-- connected".to_string()),
        RealtimeEvent::Disconnected => Some("-- disconnected; reconnecting".to_string()),
        RealtimeEvent::Message(message) => Some(format!(
            "#{} {}",
            message.conversation_id,
            message_line(message)
        )),
        RealtimeEvent::NewMessage(alert) => Some(format!(
            "#{} new message from {}: {}",
            alert.conversation_id,
            clean(&alert.sender_name),
            clean(&alert.preview)
        )),
        RealtimeEvent::Notification(notification) => Some(notification_line(notification)),
        RealtimeEvent::UnreadCount(update) => {
            Some(format!("-- {} unread messages", update.unread_count))
        }
        RealtimeEvent::Presence(_) => None,
        RealtimeEvent::Error(message) => Some(format!("-- error: {}", clean(message))),
    }
}
