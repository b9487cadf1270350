//! SQL templates.
//!
//! Both statements number the matching rows with `ROW_NUMBER()` over the
//! date ordering and keep the numbers in `(:offset, :limit]`. Dates are
//! compared on their calendar day, so a stored timestamp matches the day
//! it falls on.

/// Sales/cost view, ordered by date then product.
pub const SALES_PAGE: &str = "
    SELECT
        VS.DESCRICAO,
        VS.CODPROD,
        VS.DATA,
        VS.QT,
        VS.PVENDA,
        VS.VLCUSTOFIN
    FROM (
        SELECT
            DESCRICAO,
            CODPROD,
            DATA,
            QT,
            PVENDA,
            VLCUSTOFIN,
            ROW_NUMBER() OVER (ORDER BY date(DATA), CODPROD, DESCRICAO) AS ROW_NUM
        FROM VW_SOMELIER
        WHERE date(DATA) BETWEEN :data_inicial AND :data_final
    ) VS
    WHERE VS.ROW_NUM > :offset AND VS.ROW_NUM <= :limit
    ORDER BY VS.ROW_NUM
";

/// Order headers with salesperson and market names resolved.
///
/// Bonus orders are excluded before numbering, so a page is only short
/// when the range runs out of qualifying orders.
pub const ORDERS_PAGE: &str = "
    SELECT
        PC.NUMPED,
        PC.DATA,
        PC.VLTOTAL,
        PC.VLBONIFIC,
        PC.NOME,
        PC.CODFILIAL,
        PC.PRACA,
        PC.CODCLI
    FROM (
        SELECT
            P.NUMPED,
            P.DATA,
            P.VLTOTAL,
            P.VLBONIFIC,
            PU.NOME,
            CAST(P.CODFILIAL AS TEXT) AS CODFILIAL,
            PR.PRACA,
            P.CODCLI,
            ROW_NUMBER() OVER (ORDER BY date(P.DATA), P.NUMPED) AS ROW_NUM
        FROM PCPEDC P
        JOIN PCPRACA PR ON P.CODPRACA = PR.CODPRACA
        JOIN PCUSUARI PU ON P.CODUSUR = PU.CODUSUR
        WHERE date(P.DATA) BETWEEN :data_inicial AND :data_final
          AND P.VLBONIFIC = 0
    ) PC
    WHERE PC.ROW_NUM > :offset AND PC.ROW_NUM <= :limit
    ORDER BY PC.ROW_NUM
";
