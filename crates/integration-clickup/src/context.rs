use workdeck_core::TaskDetail;

/// Render a task as the markdown context file handed to a session.
/// Prefers the markdown description when the backend supplied one.
pub fn task_context_markdown(task: &TaskDetail) -> String {
    let mut content = String::new();

    let id_prefix = task
        .custom_id
        .as_deref()
        .map(|id| format!("{id}: "))
        .unwrap_or_default();
    content.push_str(&format!("# ClickUp Task {id_prefix}{}\n\n", task.name));
    content.push_str("---\n\n");

    content.push_str("## Description\n\n");
    let description = task
        .markdown_description
        .as_deref()
        .or(task.description.as_deref())
        .unwrap_or("");
    if description.is_empty() {
        content.push_str("*No description provided.*");
    } else {
        content.push_str(description);
    }
    content.push_str("\n\n");

    if !task.comments.is_empty() {
        content.push_str("## Comments\n\n");
        for comment in &task.comments {
            content.push_str(&format!(
                "### @{} ({})\n\n",
                comment.user.username, comment.date
            ));
            content.push_str(&comment.comment_text);
            content.push_str("\n\n---\n\n");
        }
    }

    content.push_str("---\n\n");
    content.push_str("*Investigate this task and propose a solution.*\n");

    content
}
