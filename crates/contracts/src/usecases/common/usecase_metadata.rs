/// Идентификация UseCase: индекс, имя и базовый путь HTTP API
pub trait UseCaseMetadata {
    /// Индекс вида "u501"
    fn usecase_index() -> &'static str;

    fn usecase_name() -> &'static str;

    /// Заголовок страницы
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// "u501_resolve_part_status"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }

    /// Префикс маршрутов backend, например "/api/u501"
    fn api_prefix() -> String {
        format!("/api/{}", Self::usecase_index())
    }
}
