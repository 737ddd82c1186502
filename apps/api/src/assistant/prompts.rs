// Prompt templates for the assistant. Replace `{placeholders}` before sending.

pub const SUMMARY_GENERAL_TEMPLATE: &str =
    "Please provide a clear and concise summary of the following text:\n\n{text}";

pub const SUMMARY_KEY_POINTS_TEMPLATE: &str =
    "Extract the key points from the following text and list them:\n\n{text}";

pub const SUMMARY_BRIEF_TEMPLATE: &str =
    "Provide a very brief summary (2-3 sentences) of the following text:\n\n{text}";

pub const LESSON_SUMMARY_TEMPLATE: &str = r#"Please analyze and summarize this lesson titled "{title}":

{content}

Provide:
1. A comprehensive summary
2. Key learning points
3. Important concepts to remember

Format your response to be helpful for students reviewing the material."#;

pub const CHAPTERIZED_SUMMARY_TEMPLATE: &str = r#"Divide the lesson titled "{title}" into logical chapters and summarize each one.

{content}

Use exactly this format for every chapter, numbering from 1:
Chapter 1: <chapter title>
<two to four sentences summarizing the chapter>

Do not add an introduction or a conclusion outside the chapters."#;

pub const SUGGEST_POSITIONS_TEMPLATE: &str = r#"Suggest up to {max} job positions that this lesson prepares a learner for.

Title: {title}
Description: {description}
Category: {category}

Return one job title per line, with no numbering, no explanations and no company names."#;

pub const SUGGEST_CATEGORY_TEMPLATE: &str = r#"Suggest one short category (one to three words) for this lesson.

Title: {title}
Description: {description}
Content preview: {content}

Return only the category name."#;
