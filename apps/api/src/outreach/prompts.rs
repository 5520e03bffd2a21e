pub const OUTREACH_SYSTEM: &str =
    "You are a professional HR assistant helping to recruit candidates.";

const SKILLS_PLACEHOLDER: &str = "ваш профессиональный опыт";

fn skills_phrase(skills: &[String]) -> String {
    if skills.is_empty() {
        SKILLS_PLACEHOLDER.to_string()
    } else {
        skills.join(", ")
    }
}

pub fn build_outreach_prompt(candidate_name: &str, vacancy_title: &str, skills: &[String]) -> String {
    format!(
        "Напиши вежливое и персонализированное письмо-приглашение кандидату на вакансию.\n\n\
         Имя кандидата: {candidate_name}\n\
         Вакансия: {vacancy_title}\n\
         Ключевые навыки кандидата: {}\n\n\
         Письмо должно быть:\n\
         - Коротким (не более 100 слов)\n\
         - Дружелюбным, но профессиональным\n\
         - Упоминать конкретные навыки кандидата\n\
         - Заканчиваться призывом к ответу (например, \"Когда вам удобно созвониться?\")\n\n\
         Верни ТОЛЬКО текст письма, без лишних комментариев.",
        skills_phrase(skills)
    )
}

/// Sent when neither provider answered.
pub fn template_letter(
    candidate_name: &str,
    vacancy_title: &str,
    skills: &[String],
    signature: &str,
) -> String {
    format!(
        "Здравствуйте, {candidate_name}!\n\n\
         Меня впечатлил ваш опыт, особенно владение {}. \
         Мы ищем специалиста на позицию {vacancy_title}.\n\n\
         Когда вам удобно обсудить детали?\n\n\
         С уважением,\nКоманда {signature}",
        skills_phrase(skills)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_without_skills_uses_placeholder() {
        let letter = template_letter("Анна", "QA инженер", &[], "Nexus AI");
        assert!(letter.starts_with("Здравствуйте, Анна!"));
        assert!(letter.contains("владение ваш профессиональный опыт"));
        assert!(letter.ends_with("Команда Nexus AI"));
    }

    #[test]
    fn test_prompt_lists_skills() {
        let prompt =
            build_outreach_prompt("Анна", "QA инженер", &["Selenium".into(), "Python".into()]);
        assert!(prompt.contains("Ключевые навыки кандидата: Selenium, Python"));
        assert!(prompt.contains("Вакансия: QA инженер"));
    }
}
