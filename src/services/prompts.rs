//! 评审提示词模板
//!
//! 模板中的 `{max_score}` 和 `{iterations}` 在渲染时替换。
//! 提示词使用作业本身的语言（俄语）。

use phf::phf_map;

const BASIC_PROMPT: &str = "\
Ты проверяешь домашнее задание студента по программированию и анализу данных. \
Фрагменты, которые изменил студент, начинаются с пометки [ИЗМЕНЕНО СТУДЕНТОМ]. \
Оцени решение по шкале от 0 до {max_score} баллов и кратко объясни оценку.";

const ADVANCED_PROMPT: &str = "\
Ты опытный преподаватель, который проверяет домашнее задание студента в формате Jupyter-ноутбука.
Тебе передан текст задачи вместе с решением студента. Фрагменты, которые написал или изменил студент, \
начинаются с пометки [ИЗМЕНЕНО СТУДЕНТОМ]. Остальной текст взят из исходного условия.

Проверь решение по следующим критериям:
1. Соответствие решения условию задачи.
2. Корректность кода и полученных результатов.
3. Качество выводов и комментариев студента.
4. Аккуратность и читаемость кода.

Максимальная оценка за задачу: {max_score} баллов.
Ответь в формате:
Оценка: <число от 0 до {max_score}>
Комментарий: <краткое обоснование, найденные ошибки и рекомендации>";

const AGGREGATION_PROMPT: &str = "\
Ты руководитель группы проверяющих. Решение студента уже проверили {iterations} раз(а), \
история проверок приведена в контексте диалога.
Сопоставь мнения проверяющих, устрани противоречия и выставь итоговую оценку.
Максимальная оценка за задачу: {max_score} баллов.
Ответь в формате:
Оценка: <число от 0 до {max_score}>
Комментарий: <итоговое обоснование>";

/// 名称 → 模板
pub static PROMPTS: phf::Map<&'static str, &'static str> = phf_map! {
    "basic_prompt" => BASIC_PROMPT,
    "advanced_prompt" => ADVANCED_PROMPT,
    "aggregation_prompt" => AGGREGATION_PROMPT,
};

fn fill(template: &str, max_score: u32, iterations: usize) -> String {
    template
        .replace("{max_score}", &max_score.to_string())
        .replace("{iterations}", &iterations.to_string())
}

/// 按名称渲染模板，名称不存在时返回 None
pub fn render(name: &str, max_score: u32, iterations: usize) -> Option<String> {
    PROMPTS
        .get(name)
        .map(|template| fill(template, max_score, iterations))
}

/// 默认评审提示词
pub fn advanced_prompt(max_score: u32) -> String {
    fill(ADVANCED_PROMPT, max_score, 0)
}

/// 协作评审最后一步的汇总提示词
pub fn aggregation_prompt(max_score: u32, iterations: usize) -> String {
    fill(AGGREGATION_PROMPT, max_score, iterations)
}

/// 配置中的提示词：模板名称则渲染，否则按原文使用
pub fn resolve_prompt(value: &str, max_score: u32) -> String {
    render(value, max_score, 0).unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advanced_prompt_has_score() {
        let prompt = advanced_prompt(7);
        assert!(prompt.contains("7 баллов"));
        assert!(!prompt.contains("{max_score}"));
    }

    #[test]
    fn test_aggregation_prompt_has_iterations() {
        let prompt = aggregation_prompt(10, 3);
        assert!(prompt.contains("3 раз"));
        assert!(prompt.contains("10 баллов"));
    }

    #[test]
    fn test_render_unknown_is_none() {
        assert!(render("missing_prompt", 10, 0).is_none());
        assert!(render("basic_prompt", 5, 0).unwrap().contains("до 5"));
    }

    #[test]
    fn test_resolve_prompt() {
        assert_eq!(resolve_prompt("advanced_prompt", 4), advanced_prompt(4));
        assert_eq!(resolve_prompt("Оцени кратко.", 4), "Оцени кратко.");
    }
}
